//! `xet download <appid> <capture>` – fetch the best URL of a capture file.

use anyhow::Result;
use std::path::{Path, PathBuf};
use xet_core::config::XetConfig;
use xet_core::download::Downloader;

use super::open_shop;

/// Print the output path, or fail when nothing was downloaded.
pub(super) fn report_download(capture: &Path, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            println!("Downloaded: {}", path.display());
            Ok(())
        }
        None => anyhow::bail!(
            "nothing downloaded from {} (missing capture or no media candidates)",
            capture.display()
        ),
    }
}

pub fn run_download(
    cfg: &XetConfig,
    appid: &str,
    capture: &Path,
    title: Option<&str>,
    download_dir: Option<&Path>,
) -> Result<()> {
    let shop = open_shop(cfg, appid, download_dir)?;
    let downloader = Downloader::new(cfg, &shop.download_dir);
    report_download(capture, downloader.download_from_capture(capture, title)?)
}
