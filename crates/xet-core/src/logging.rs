//! Log setup: append to `xet.log` under the XDG state dir, or go to stderr
//! when that directory is unusable.

use anyhow::{anyhow, Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info,xet=debug,xet_core=debug";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `$XDG_STATE_HOME/xet/xet.log`; the directory is created on the way.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("xet").context("locate XDG state directory")?;
    dirs.place_state_file("xet.log")
        .context("create log directory")
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

fn install<W>(writer: W) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install log subscriber: {e}"))
}

/// Send logs to the state-dir log file. Returns the file's path; on error
/// nothing is installed and the caller may fall back to stderr.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = open_append(&path)?;
    install(Mutex::new(file))?;
    Ok(path)
}

/// Send logs to stderr. Fails if a subscriber is already installed.
pub fn init_logging_stderr() -> Result<()> {
    install(std::io::stderr)
}
