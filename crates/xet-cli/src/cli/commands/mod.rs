//! CLI command handlers, one file per group of subcommands.

mod batch;
mod capture;
mod download;
mod list;

pub use batch::{run_download_product, BatchArgs};
pub use capture::{run_capture, run_quick, run_quick_resource, CaptureArgs};
pub use download::run_download;
pub use list::{run_list_products, run_list_resources};

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use xet_core::config::XetConfig;
use xet_core::shop::Shop;

/// `--wait` if given, else the configured default.
fn wait_or(secs: Option<u64>, default_secs: u64) -> Duration {
    Duration::from_secs(secs.unwrap_or(default_secs))
}

/// Shop layout with an optional download directory override; creates the
/// directories.
fn open_shop(cfg: &XetConfig, appid: &str, download_dir: Option<&Path>) -> Result<Shop> {
    match download_dir {
        Some(dir) => {
            let mut cfg = cfg.clone();
            cfg.download_dir = dir.to_path_buf();
            Shop::open(&cfg, appid)
        }
        None => Shop::open(cfg, appid),
    }
}
