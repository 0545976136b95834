//! On-disk capture and listing records.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::browser::BrowserCookie;
use crate::entity::Entity;
use crate::sniff::Candidate;
use crate::storage;

/// Everything needed to fetch one resource outside the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub appid: String,
    #[serde(default)]
    pub resource_id: String,
    pub page_url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub cookies: Vec<BrowserCookie>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub captured_at: i64,
}

impl CaptureRecord {
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }
}

/// Entities discovered on a catalog or product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingRecord {
    Catalog {
        appid: String,
        entry_url: String,
        products: Vec<Entity>,
        captured_at: i64,
    },
    Product {
        appid: String,
        product_id: Option<String>,
        product_url: String,
        resources: Vec<Entity>,
        captured_at: i64,
    },
}

impl ListingRecord {
    pub fn entities(&self) -> &[Entity] {
        match self {
            ListingRecord::Catalog { products, .. } => products,
            ListingRecord::Product { resources, .. } => resources,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(value).context("serialize record")?;
    storage::write_atomic(path, &json)
}
