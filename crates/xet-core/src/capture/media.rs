//! Resource page capture: sniff media URLs, keep cookies and headers.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::record::CaptureRecord;
use super::session::{run_session, SessionPlan, Sniffer};
use super::{mirror, now_unix, UNKNOWN_RESOURCE};
use crate::browser::{BrowserEngine, LaunchSpec};
use crate::config::XetConfig;
use crate::error::StepReport;
use crate::shop::Shop;
use crate::sniff::{match_response, push_unique, Candidate, InterceptedResponse};
use crate::urls;

/// Collects media candidates in first-seen order, one entry per URL.
#[derive(Debug, Default)]
pub struct MediaSniffer {
    candidates: Vec<Candidate>,
}

impl MediaSniffer {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl Sniffer for MediaSniffer {
    fn observe(&mut self, resp: &InterceptedResponse) -> usize {
        match match_response(resp) {
            Some(c) => usize::from(push_unique(&mut self.candidates, c)),
            None => 0,
        }
    }
}

/// One resource capture request.
#[derive(Debug, Clone)]
pub struct ResourceCapture {
    pub page_url: String,
    /// Overrides the id inferred from the page URL.
    pub resource_id: Option<String>,
    pub wait: Duration,
    pub headless: bool,
    /// Also merge cookies into the legacy key-value store.
    pub mirror_cookies: bool,
}

impl ResourceCapture {
    pub fn new(page_url: impl Into<String>, wait: Duration) -> Self {
        Self {
            page_url: page_url.into(),
            resource_id: None,
            wait,
            headless: false,
            mirror_cookies: false,
        }
    }

    /// Explicit id, else the `a_…`/`v_…` path segment, else `unknown_resource`.
    pub fn effective_resource_id(&self) -> String {
        self.resource_id
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| urls::resource_id_from_url(&self.page_url))
            .unwrap_or_else(|| UNKNOWN_RESOURCE.to_string())
    }
}

#[derive(Debug)]
pub struct CaptureOutcome {
    pub path: PathBuf,
    pub record: CaptureRecord,
    pub report: StepReport,
}

pub(crate) fn launch_spec(cfg: &XetConfig, shop: &Shop, headless: bool, wait: Duration) -> LaunchSpec {
    let command_timeout = cfg.capture.navigation_timeout();
    LaunchSpec {
        profile_dir: shop.profile_dir.clone(),
        headless,
        command_timeout,
        // The driver must outlive the longest silent stretch of a wait.
        idle_timeout: wait.max(command_timeout) + Duration::from_secs(30),
    }
}

/// Open `req.page_url`, nudge playback, and persist the capture record to
/// `captured/<appid>/<resource_id>.json`.
pub fn capture_resource<E: BrowserEngine>(
    engine: &E,
    cfg: &XetConfig,
    shop: &Shop,
    req: &ResourceCapture,
) -> Result<CaptureOutcome> {
    let resource_id = req.effective_resource_id();
    let path = shop.capture_path(&resource_id)?;
    let plan = SessionPlan {
        url: req.page_url.clone(),
        launch: launch_spec(cfg, shop, req.headless, req.wait),
        wait: req.wait,
        poll_interval: cfg.capture.poll_interval(),
        settle: Duration::from_millis(cfg.capture.media_settle_ms),
        scroll_delta: cfg.capture.media_scroll_px,
        interaction: Some(Duration::from_millis(cfg.capture.interaction_delay_ms)),
        click_settle: Duration::from_millis(cfg.capture.click_settle_ms),
        user_agent: cfg.user_agent.clone(),
    };

    info!(appid = %shop.appid, resource_id = %resource_id, "capturing resource");
    let mut sniffer = MediaSniffer::default();
    let out = run_session(engine, &plan, &mut sniffer, |sniffer, harvest| {
        let record = CaptureRecord {
            appid: shop.appid.clone(),
            resource_id: resource_id.clone(),
            page_url: req.page_url.clone(),
            headers: harvest.headers.clone(),
            cookies: harvest.cookies.clone(),
            candidates: sniffer.candidates().to_vec(),
            captured_at: now_unix(),
        };
        record.save(&path)?;
        Ok(record)
    })?;

    if req.mirror_cookies {
        if let Some(mirror_path) = &cfg.cookie_mirror_path {
            let cookies = &out.value.cookies;
            if let Err(e) = mirror::mirror_cookies(mirror_path, &shop.appid, cookies, now_unix()) {
                warn!("cookie mirror not updated: {e:#}");
            }
        }
    }

    info!(
        path = %path.display(),
        candidates = out.value.candidates.len(),
        step_errors = out.report.errors().len(),
        "capture saved"
    );
    Ok(CaptureOutcome {
        path,
        record: out.value,
        report: out.report,
    })
}
