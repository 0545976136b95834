//! Download the best captured candidate outside the browser.

mod fetch;

pub use fetch::{fetch_to_file, CurlOptions};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::capture::CaptureRecord;
use crate::config::XetConfig;
use crate::resolver::Resolver;
use crate::retry::RetryPolicy;
use crate::url_model::derive_filename;

/// Fetches media named by capture records into one flat directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    download_dir: PathBuf,
    curl: CurlOptions,
    retry: RetryPolicy,
}

impl Downloader {
    pub fn new(cfg: &XetConfig, download_dir: &Path) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
            curl: CurlOptions::from(&cfg.http),
            retry: cfg.retry_policy(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Read the capture at `capture_path` and download its best candidate.
    ///
    /// `Ok(None)` when the capture file is missing or has no candidate;
    /// `Err` for unreadable captures, HTTP failures and I/O failures.
    pub fn download_from_capture(
        &self,
        capture_path: &Path,
        title: Option<&str>,
    ) -> Result<Option<PathBuf>> {
        if !capture_path.exists() {
            warn!(path = %capture_path.display(), "capture file not found");
            return Ok(None);
        }
        let record = CaptureRecord::load(capture_path)?;
        self.download(&record, title)
    }

    /// Download the best candidate of `record`, named after `title` or the
    /// record's resource id.
    pub fn download(&self, record: &CaptureRecord, title: Option<&str>) -> Result<Option<PathBuf>> {
        let Some(spec) = record.resolve() else {
            warn!(resource_id = %record.resource_id, "no media candidates in capture");
            return Ok(None);
        };

        let resource_id = Some(record.resource_id.as_str()).filter(|r| !r.is_empty());
        let name = derive_filename(&spec.url, title, resource_id);
        std::fs::create_dir_all(&self.download_dir)
            .with_context(|| format!("create directory {}", self.download_dir.display()))?;
        let dest = self.download_dir.join(name);

        info!(url = %spec.url, dest = %dest.display(), "downloading");
        let bytes = fetch_to_file(&spec, &dest, &self.curl, &self.retry)?;
        info!(dest = %dest.display(), bytes, "download complete");
        Ok(Some(dest))
    }
}
