#![allow(dead_code)]

pub mod fake_browser;
pub mod media_server;

use std::path::Path;
use xet_core::config::XetConfig;

/// Config with every directory under `root` and waits short enough for tests.
pub fn test_config(root: &Path) -> XetConfig {
    let mut cfg = XetConfig::default();
    cfg.profile_root = root.join("browser_data");
    cfg.capture_root = root.join("captured");
    cfg.download_dir = root.join("download");
    cfg.cookie_mirror_path = Some(root.join("config.json"));
    cfg.capture.poll_interval_ms = 20;
    cfg.capture.interaction_delay_ms = 0;
    cfg.capture.click_settle_ms = 0;
    cfg.capture.media_settle_ms = 0;
    cfg.capture.listing_settle_ms = 60;
    cfg.batch.sleep_min_secs = 0.0;
    cfg.batch.sleep_max_secs = 0.0;
    cfg
}
