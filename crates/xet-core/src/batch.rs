//! Whole-product download: list a product's resources, then capture and
//! download each one in turn.

use anyhow::Result;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::browser::BrowserEngine;
use crate::capture::{capture_resource, capture_resources, ResourceCapture};
use crate::config::XetConfig;
use crate::download::Downloader;
use crate::entity::Entity;
use crate::shop::Shop;
use crate::url_model::sanitize_filename;

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub product_id: String,
    pub list_wait: Duration,
    pub capture_wait: Duration,
    /// Index of the first resource to process.
    pub start: usize,
    /// Process at most this many resources; `None` for all.
    pub max: Option<usize>,
    pub headless_list: bool,
    pub headless_capture: bool,
    pub sleep_min_secs: f64,
    pub sleep_max_secs: f64,
}

impl BatchPlan {
    pub fn new(cfg: &XetConfig, product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            list_wait: Duration::from_secs(cfg.capture.listing_wait_secs),
            capture_wait: Duration::from_secs(cfg.capture.capture_wait_secs),
            start: 0,
            max: None,
            headless_list: false,
            headless_capture: false,
            sleep_min_secs: cfg.batch.sleep_min_secs,
            sleep_max_secs: cfg.batch.sleep_max_secs,
        }
    }

    /// `[start, start + max)` clamped to `len`.
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.start.min(len);
        let end = match self.max {
            Some(m) => start.saturating_add(m).min(len),
            None => len,
        };
        start..end
    }

    /// Uniformly random pause between items; bounds may come in either order.
    pub fn courtesy_delay(&self) -> Duration {
        let lo = self.sleep_min_secs.min(self.sleep_max_secs).max(0.0);
        let hi = self.sleep_min_secs.max(self.sleep_max_secs).max(lo);
        let secs = if hi > lo {
            rand::thread_rng().gen_range(lo..=hi)
        } else {
            lo
        };
        Duration::from_secs_f64(secs)
    }
}

/// Counts of a finished batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Resources found on the product page.
    pub listed: usize,
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// A file named `<stem>.<anything>` already in `dir`.
pub fn existing_download(dir: &Path, stem: &str) -> Option<PathBuf> {
    let prefix = format!("{stem}.");
    std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .find(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(&prefix) && !n.ends_with(crate::storage::TEMP_SUFFIX))
        })
        .map(|e| e.path())
}

enum ItemResult {
    Done(PathBuf),
    Skipped(PathBuf),
    Empty,
}

fn process_item<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    shop: &Shop,
    downloader: &Downloader,
    plan: &BatchPlan,
    item: &Entity,
) -> Result<ItemResult> {
    let title = item.display_name();
    if let Some(existing) = existing_download(downloader.download_dir(), &sanitize_filename(title)) {
        return Ok(ItemResult::Skipped(existing));
    }

    let mut req = ResourceCapture::new(
        shop.resource_url(&item.id, Some(&plan.product_id)),
        plan.capture_wait,
    );
    req.resource_id = Some(item.id.clone());
    req.headless = plan.headless_capture;
    let capture = capture_resource(engine, cfg, shop, &req)?;

    Ok(match downloader.download(&capture.record, Some(title))? {
        Some(path) => ItemResult::Done(path),
        None => ItemResult::Empty,
    })
}

/// List the resources of `plan.product_id` and fetch each one.
///
/// Only the listing step can fail the run; per-item failures are logged
/// and counted.
pub fn run_batch<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    shop: &Shop,
    downloader: &Downloader,
    plan: &BatchPlan,
) -> Result<BatchSummary> {
    let product_url = shop.product_url(&plan.product_id);
    let listing = capture_resources(
        engine,
        cfg,
        shop,
        &product_url,
        Some(&plan.product_id),
        plan.list_wait,
        plan.headless_list,
    )?;
    let resources = listing.record.entities();
    let window = plan.window(resources.len());
    let mut summary = BatchSummary {
        listed: resources.len(),
        ..BatchSummary::default()
    };
    info!(
        product = %plan.product_id,
        found = resources.len(),
        start = window.start,
        end = window.end,
        "batch selected"
    );

    let last = window.end.saturating_sub(1);
    for idx in window.clone() {
        let item = &resources[idx];
        // Skips touch nothing remote, so only they go without a pause.
        let fetched = match process_item(engine, cfg, shop, downloader, plan, item) {
            Ok(ItemResult::Skipped(existing)) => {
                info!(idx, id = %item.id, existing = %existing.display(), "already downloaded, skipping");
                summary.skipped += 1;
                false
            }
            Ok(ItemResult::Done(path)) => {
                info!(idx, id = %item.id, path = %path.display(), "item done");
                summary.done += 1;
                true
            }
            Ok(ItemResult::Empty) => {
                warn!(idx, id = %item.id, "no media captured for item");
                summary.failed += 1;
                true
            }
            Err(e) => {
                warn!(idx, id = %item.id, "item failed: {e:#}");
                summary.failed += 1;
                true
            }
        };
        if fetched && idx < last {
            let delay = plan.courtesy_delay();
            info!(idx, delay_secs = delay.as_secs_f64(), "sleeping before next item");
            std::thread::sleep(delay);
        }
    }

    info!(
        done = summary.done,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch finished"
    );
    Ok(summary)
}
