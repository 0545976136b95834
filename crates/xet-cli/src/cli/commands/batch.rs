//! `xet download-product <appid> <product_id>` – fetch every resource of a product.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use xet_core::batch::{run_batch, BatchPlan};
use xet_core::browser::BrowserEngine;
use xet_core::config::XetConfig;
use xet_core::download::Downloader;

use super::open_shop;

#[derive(Debug, Clone)]
pub struct BatchArgs {
    pub product_id: String,
    pub wait_list: Option<u64>,
    pub wait_capture: Option<u64>,
    pub start: usize,
    pub max: Option<usize>,
    pub headless_list: bool,
    pub headless: bool,
    pub sleep_min: Option<f64>,
    pub sleep_max: Option<f64>,
    pub download_dir: Option<PathBuf>,
}

impl BatchArgs {
    pub(crate) fn plan(&self, cfg: &XetConfig) -> BatchPlan {
        let mut plan = BatchPlan::new(cfg, self.product_id.clone());
        if let Some(secs) = self.wait_list {
            plan.list_wait = Duration::from_secs(secs);
        }
        if let Some(secs) = self.wait_capture {
            plan.capture_wait = Duration::from_secs(secs);
        }
        plan.start = self.start;
        plan.max = self.max;
        plan.headless_list = self.headless_list;
        plan.headless_capture = self.headless;
        if let Some(s) = self.sleep_min {
            plan.sleep_min_secs = s;
        }
        if let Some(s) = self.sleep_max {
            plan.sleep_max_secs = s;
        }
        plan
    }
}

pub fn run_download_product<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    appid: &str,
    args: &BatchArgs,
) -> Result<()> {
    let shop = open_shop(cfg, appid, args.download_dir.as_deref())?;
    let downloader = Downloader::new(cfg, &shop.download_dir);
    let summary = run_batch(engine, cfg, &shop, &downloader, &args.plan(cfg))?;
    println!(
        "Found {} resources under {}: {} downloaded, {} skipped, {} failed",
        summary.listed, args.product_id, summary.done, summary.skipped, summary.failed
    );
    Ok(())
}
