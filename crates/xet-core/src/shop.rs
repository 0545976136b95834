//! Per-shop directory layout.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::XetConfig;
use crate::urls;

/// Directories and URLs for one shop (`appid`).
#[derive(Debug, Clone)]
pub struct Shop {
    pub appid: String,
    /// Persistent browser profile reused across runs to keep the login.
    pub profile_dir: PathBuf,
    pub capture_dir: PathBuf,
    pub download_dir: PathBuf,
    pub home_url: String,
}

impl Shop {
    /// Resolve paths for `appid` from the config and create them.
    pub fn open(cfg: &XetConfig, appid: &str) -> Result<Self> {
        let shop = Self::layout(cfg, appid);
        for dir in [&shop.profile_dir, &shop.capture_dir, &shop.download_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("create directory {}", dir.display()))?;
        }
        Ok(shop)
    }

    /// Same as `open` without touching the filesystem.
    pub fn layout(cfg: &XetConfig, appid: &str) -> Self {
        Shop {
            appid: appid.to_string(),
            profile_dir: cfg.profile_root.join(appid),
            capture_dir: cfg.capture_root.join(appid),
            download_dir: cfg.download_dir.clone(),
            home_url: urls::shop_url(&cfg.shop_url_template, appid),
        }
    }

    /// Record path for a resource. Ids come from pages and API payloads, so
    /// anything but a plain word is refused instead of joined.
    pub fn capture_path(&self, resource_id: &str) -> Result<PathBuf> {
        let key = file_key(resource_id)?;
        Ok(self.capture_dir.join(format!("{key}.json")))
    }

    pub fn products_path(&self) -> PathBuf {
        self.capture_dir.join("products.json")
    }

    pub fn resources_path(&self, product_key: &str) -> Result<PathBuf> {
        let key = file_key(product_key)?;
        Ok(self.capture_dir.join(format!("{key}_resources.json")))
    }

    pub fn product_url(&self, product_id: &str) -> String {
        urls::product_page_url(&self.home_url, product_id)
    }

    pub fn resource_url(&self, resource_id: &str, product_id: Option<&str>) -> String {
        urls::resource_page_url(&self.home_url, resource_id, product_id)
    }
}

fn file_key(key: &str) -> Result<&str> {
    if !urls::is_word_tail(key) {
        bail!("refusing to use {key:?} as a capture file name");
    }
    Ok(key)
}
