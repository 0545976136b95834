//! `xet capture`, `xet quick`, `xet quick-resource`.

use anyhow::Result;
use std::path::{Path, PathBuf};
use xet_core::browser::BrowserEngine;
use xet_core::capture::{capture_resource, ResourceCapture};
use xet_core::config::XetConfig;
use xet_core::download::Downloader;
use xet_core::shop::Shop;

use super::download::report_download;
use super::{open_shop, wait_or};

/// Page to capture and how long to wait for it.
#[derive(Debug, Clone)]
pub struct CaptureArgs {
    pub resource_url: String,
    pub resource_id: Option<String>,
    pub wait: Option<u64>,
    pub headless: bool,
}

fn capture<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    shop: &Shop,
    args: &CaptureArgs,
    mirror_cookies: bool,
) -> Result<PathBuf> {
    let mut req = ResourceCapture::new(
        args.resource_url.clone(),
        wait_or(args.wait, cfg.capture.capture_wait_secs),
    );
    req.resource_id = args.resource_id.clone();
    req.headless = args.headless;
    req.mirror_cookies = mirror_cookies;

    let out = capture_resource(engine, cfg, shop, &req)?;
    if out.record.candidates.is_empty() {
        println!("No media URL seen before the wait ended.");
    }
    for e in out.report.errors() {
        println!("  warning: {e}");
    }
    println!("Capture saved to: {}", out.path.display());
    Ok(out.path)
}

pub fn run_capture<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    appid: &str,
    args: &CaptureArgs,
) -> Result<()> {
    let shop = open_shop(cfg, appid, None)?;
    capture(engine, cfg, &shop, args, true)?;
    Ok(())
}

pub fn run_quick<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    appid: &str,
    args: &CaptureArgs,
    title: Option<&str>,
    download_dir: Option<&Path>,
) -> Result<()> {
    let shop = open_shop(cfg, appid, download_dir)?;
    let capture_path = capture(engine, cfg, &shop, args, false)?;
    let downloader = Downloader::new(cfg, &shop.download_dir);
    report_download(&capture_path, downloader.download_from_capture(&capture_path, title)?)
}

#[allow(clippy::too_many_arguments)]
pub fn run_quick_resource<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    appid: &str,
    product_id: &str,
    resource_id: &str,
    wait: Option<u64>,
    headless: bool,
    title: Option<&str>,
    download_dir: Option<&Path>,
) -> Result<()> {
    let shop = open_shop(cfg, appid, download_dir)?;
    let args = CaptureArgs {
        resource_url: shop.resource_url(resource_id, Some(product_id)),
        resource_id: Some(resource_id.to_string()),
        wait,
        headless,
    };
    let capture_path = capture(engine, cfg, &shop, &args, false)?;
    let downloader = Downloader::new(cfg, &shop.download_dir);
    report_download(&capture_path, downloader.download_from_capture(&capture_path, title)?)
}
