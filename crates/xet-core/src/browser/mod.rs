//! Browser seam: launch a persistent-profile browser, forward every
//! intercepted response into a channel, and expose the few page actions a
//! capture session needs.
//!
//! The capture loop only sees [`BrowserEngine`] and [`PageDriver`]; the
//! Chrome implementation lives in [`chrome`].

pub mod chrome;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::error::StepError;
use crate::sniff::InterceptedResponse;

pub use chrome::ChromeEngine;

/// Cookie as harvested from the browser profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    /// Unix seconds; -1 for session cookies.
    #[serde(default)]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

/// How to start the browser for one session.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Reused across runs so the shop login survives.
    pub profile_dir: PathBuf,
    pub headless: bool,
    /// Timeout applied to navigation and page commands.
    pub command_timeout: Duration,
    /// How long the browser may stay silent before the driver gives up on it.
    pub idle_timeout: Duration,
}

/// Starts browsers. `events` receives every response the page loads, in
/// arrival order, for as long as the page lives.
pub trait BrowserEngine {
    type Page: PageDriver;

    fn launch(&self, spec: &LaunchSpec, events: Sender<InterceptedResponse>)
        -> anyhow::Result<Self::Page>;
}

/// Page actions used by capture sessions. Every action reports failure as
/// a [`StepError`]; none of them is fatal to a session.
pub trait PageDriver {
    fn navigate(&mut self, url: &str) -> Result<(), StepError>;

    /// Click whatever looks like a play button.
    fn click_play(&mut self) -> Result<(), StepError>;

    /// Call `play()` on the first audio/video element.
    fn play_media(&mut self) -> Result<(), StepError>;

    fn scroll_by(&mut self, delta_y: i64) -> Result<(), StepError>;

    fn cookies(&mut self) -> Result<Vec<BrowserCookie>, StepError>;

    fn close(self) -> Result<(), StepError>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_uses_camel_case_on_disk() {
        let c = BrowserCookie {
            name: "ko_token".into(),
            value: "abc".into(),
            domain: ".xet.citv.cn".into(),
            path: "/".into(),
            expires: -1.0,
            http_only: true,
            secure: false,
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["httpOnly"], true);
        let back: BrowserCookie =
            serde_json::from_value(serde_json::json!({"name": "a", "value": "b", "domain": "x"})).unwrap();
        assert_eq!(back.path, "");
        assert!(!back.secure);
    }
}
