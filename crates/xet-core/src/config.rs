use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per download (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(cfg.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }
}

/// Timing knobs for browser capture sessions.
///
/// The settle windows differ between the media and the listing path; both
/// are plain parameters rather than a single fixed constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Interval between signal checks while waiting (milliseconds).
    pub poll_interval_ms: u64,
    /// CDP timeout for navigation and page commands (seconds).
    pub navigation_timeout_secs: u64,
    /// Delay before the synthetic play interaction (milliseconds).
    pub interaction_delay_ms: u64,
    /// Pause between the synthetic play click and the `play()` call (milliseconds).
    pub click_settle_ms: u64,
    /// Quiet time after the last media candidate before the wait ends (milliseconds).
    pub media_settle_ms: u64,
    /// Quiet time after the last entity before a listing wait ends (milliseconds).
    pub listing_settle_ms: u64,
    /// Scroll distance per idle tick on resource pages.
    pub media_scroll_px: i64,
    /// Scroll distance per idle tick on the shop catalog page.
    pub catalog_scroll_px: i64,
    /// Scroll distance per idle tick on a product page.
    pub product_scroll_px: i64,
    /// Deepest JSON nesting level the entity walker descends into.
    pub max_walk_depth: usize,
    /// Default wait for resource captures (seconds).
    pub capture_wait_secs: u64,
    /// Default wait for listing captures (seconds).
    pub listing_wait_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            navigation_timeout_secs: 60,
            interaction_delay_ms: 800,
            click_settle_ms: 300,
            media_settle_ms: 0,
            listing_settle_ms: 2000,
            media_scroll_px: 800,
            catalog_scroll_px: 1000,
            product_scroll_px: 1200,
            max_walk_depth: 64,
            capture_wait_secs: 180,
            listing_wait_secs: 120,
        }
    }
}

impl CaptureConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

/// Courtesy backoff between consecutive batch downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub sleep_min_secs: f64,
    pub sleep_max_secs: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sleep_min_secs: 2.0,
            sleep_max_secs: 7.0,
        }
    }
}

/// libcurl limits for the media GET.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Abort when slower than `low_speed_limit_bytes` for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Hard cap for a whole transfer.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
        }
    }
}

/// Global configuration loaded from `~/.config/xet/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XetConfig {
    /// Root of the persistent browser profiles (one directory per shop).
    pub profile_root: PathBuf,
    /// Root of capture and listing files (one directory per shop).
    pub capture_root: PathBuf,
    /// Flat output directory for downloaded media.
    pub download_dir: PathBuf,
    /// Shop home URL; `{appid}` is replaced by the shop id.
    pub shop_url_template: String,
    /// User-Agent sent with captured headers.
    pub user_agent: String,
    /// Key-value file the standalone capture mirrors cookies into (None = off).
    #[serde(default)]
    pub cookie_mirror_path: Option<PathBuf>,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub http: HttpConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

impl Default for XetConfig {
    fn default() -> Self {
        Self {
            profile_root: PathBuf::from("browser_data"),
            capture_root: PathBuf::from("captured"),
            download_dir: PathBuf::from("download"),
            shop_url_template: "https://{appid}.xet.citv.cn".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookie_mirror_path: Some(PathBuf::from("config.json")),
            capture: CaptureConfig::default(),
            batch: BatchConfig::default(),
            http: HttpConfig::default(),
            retry: None,
        }
    }
}

impl XetConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_else(|| RetryPolicy::from(&RetryConfig::default()))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("xet")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<XetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = XetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: XetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
