//! Single-stream HTTP GET into a temp file, published by rename.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::resolver::ResolvedJobSpec;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::storage::{self, StorageWriter};

/// libcurl limits for one transfer.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub timeout: Duration,
}

impl From<&HttpConfig> for CurlOptions {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

/// GET `spec.url` into `dest`. The body goes to `<dest>.part` first and is
/// renamed only after a complete 2xx transfer; on failure the temp file is
/// removed. Returns the number of bytes written.
pub fn fetch_to_file(
    spec: &ResolvedJobSpec,
    dest: &Path,
    opts: &CurlOptions,
    policy: &RetryPolicy,
) -> Result<u64> {
    let mut writer = StorageWriter::create(&storage::temp_path(dest))?;

    let result = run_with_retry(policy, |attempt| {
        if attempt > 1 {
            writer.reset()?;
        }
        get_once(&spec.url, &spec.headers, &mut writer, opts)
    });

    match result {
        Ok(written) => {
            writer.finalize(dest)?;
            Ok(written)
        }
        Err(e) => {
            writer.discard();
            Err(anyhow::Error::new(e)).with_context(|| format!("GET {}", spec.url))
        }
    }
}

fn get_once(
    url: &str,
    headers: &BTreeMap<String, String>,
    writer: &mut StorageWriter,
    opts: &CurlOptions,
) -> Result<u64, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.timeout(opts.timeout)?;

    if !headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }

    let mut write_err: Option<io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match writer.append(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                tracing::warn!("media write failed: {}", e);
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Some(e) = write_err {
        return Err(FetchError::Storage(e));
    }
    performed?;

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    writer.sync().map_err(|e| FetchError::Storage(io::Error::other(format!("{e:#}"))))?;
    Ok(writer.written())
}
