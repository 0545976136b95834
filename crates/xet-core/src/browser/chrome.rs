//! Chrome over CDP via `headless_chrome`.
//!
//! The driver's event thread calls our response handler; the handler only
//! converts the response and pushes it into the session's channel.

use anyhow::{Context, Result};
use headless_chrome::protocol::cdp::Network;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use super::{BrowserCookie, BrowserEngine, LaunchSpec, PageDriver};
use crate::error::StepError;
use crate::sniff::InterceptedResponse;

const HANDLER_NAME: &str = "xet-response-sniffer";

/// Grace period before asking for a JSON body; the body is usually not
/// buffered yet when the response headers arrive.
const BODY_FETCH_DELAY: Duration = Duration::from_millis(100);

/// Bodies larger than this are not parsed.
const MAX_JSON_BODY: usize = 5_000_000;

const CLICK_PLAY_JS: &str = r#"
(() => {
  const byText = Array.from(document.querySelectorAll('button'))
    .find(b => (b.innerText || '').includes('播放'));
  const target = byText
    || document.querySelector("[aria-label='播放']")
    || document.querySelector('.play')
    || document.querySelector('.player-play')
    || document.querySelector('button');
  if (!target) return false;
  target.click();
  return true;
})()
"#;

const PLAY_MEDIA_JS: &str = r#"
(() => {
  const media = document.querySelector('audio, video');
  if (!media) return false;
  media.muted = false;
  const p = media.play();
  if (p && p.catch) p.catch(() => {});
  return true;
})()
"#;

/// Launches a local Chrome/Chromium with a persistent user-data directory.
#[derive(Debug, Clone, Default)]
pub struct ChromeEngine {
    /// Extra command-line switches passed to the browser.
    pub extra_args: Vec<String>,
}

impl BrowserEngine for ChromeEngine {
    type Page = ChromePage;

    fn launch(&self, spec: &LaunchSpec, events: Sender<InterceptedResponse>) -> Result<ChromePage> {
        let mut args: Vec<&OsStr> = vec![
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--autoplay-policy=no-user-gesture-required"),
        ];
        args.extend(self.extra_args.iter().map(OsStr::new));

        let options = LaunchOptions::default_builder()
            .headless(spec.headless)
            .user_data_dir(Some(spec.profile_dir.clone()))
            .idle_browser_timeout(spec.idle_timeout)
            .args(args)
            .build()
            .map_err(|e| anyhow::anyhow!("invalid browser launch options: {e}"))?;

        debug!(profile = %spec.profile_dir.display(), headless = spec.headless, "launching browser");
        let browser = Browser::new(options).context("failed to launch browser")?;
        let tab = browser.new_tab().context("failed to open browser tab")?;
        tab.set_default_timeout(spec.command_timeout);

        let sink = Mutex::new(events);
        tab.register_response_handling(
            HANDLER_NAME,
            Box::new(move |params, fetch_body| {
                let resp = &params.response;
                let mut event = InterceptedResponse::new(resp.url.clone(), &resp.mime_type);
                if event.is_json() {
                    std::thread::sleep(BODY_FETCH_DELAY);
                    match fetch_body() {
                        Ok(body) if body.base_64_encoded => {
                            debug!(url = %event.url, "skipping base64 JSON body");
                        }
                        Ok(body) if body.body.len() > MAX_JSON_BODY => {
                            debug!(url = %event.url, len = body.body.len(), "skipping oversized JSON body");
                        }
                        Ok(body) => match serde_json::from_str(&body.body) {
                            Ok(value) => event.body = Some(value),
                            Err(e) => debug!(url = %event.url, "JSON body did not parse: {e}"),
                        },
                        Err(e) => debug!(url = %event.url, "response body unavailable: {e}"),
                    }
                }
                if let Ok(tx) = sink.lock() {
                    // Receiver gone means the session already ended.
                    let _ = tx.send(event);
                }
            }),
        )
        .context("failed to register response handler")?;

        Ok(ChromePage {
            tab,
            _browser: browser,
        })
    }
}

/// One tab in a launched browser. Dropping it shuts the browser down.
pub struct ChromePage {
    tab: Arc<Tab>,
    _browser: Browser,
}

impl ChromePage {
    fn eval(&self, action: &'static str, js: &str) -> Result<(), StepError> {
        self.tab
            .evaluate(js, false)
            .map(|_| ())
            .map_err(|e| StepError::Interact {
                action,
                reason: e.to_string(),
            })
    }
}

impl PageDriver for ChromePage {
    fn navigate(&mut self, url: &str) -> Result<(), StepError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| StepError::Navigate {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn click_play(&mut self) -> Result<(), StepError> {
        self.eval("click play", CLICK_PLAY_JS)
    }

    fn play_media(&mut self) -> Result<(), StepError> {
        self.eval("play media", PLAY_MEDIA_JS)
    }

    fn scroll_by(&mut self, delta_y: i64) -> Result<(), StepError> {
        self.eval("scroll", &format!("window.scrollBy(0, {delta_y})"))
    }

    /// Every cookie in the profile, not just those sent to the current
    /// page: CDN and parent-domain cookies are needed for the download.
    fn cookies(&mut self) -> Result<Vec<BrowserCookie>, StepError> {
        let reply = self
            .tab
            .call_method(Network::GetAllCookies(None))
            .map_err(|e| StepError::Harvest(e.to_string()))?;
        Ok(reply.cookies.into_iter().map(BrowserCookie::from).collect())
    }

    fn close(self) -> Result<(), StepError> {
        let deregistered = self
            .tab
            .deregister_response_handling(HANDLER_NAME)
            .map(|_| ());
        let closed = self.tab.close(true).map(|_| ());
        close_outcome(deregistered, closed)
    }
}

impl From<Network::Cookie> for BrowserCookie {
    fn from(c: Network::Cookie) -> Self {
        BrowserCookie {
            name: c.name,
            value: c.value,
            domain: c.domain,
            path: c.path,
            expires: c.expires,
            http_only: c.http_only,
            secure: c.secure,
        }
    }
}

/// The tab close error wins; a handler that could not be removed is
/// reported only when the tab itself closed.
fn close_outcome(deregistered: Result<()>, closed: Result<()>) -> Result<(), StepError> {
    match (deregistered, closed) {
        (_, Err(e)) => Err(StepError::Close(e.to_string())),
        (Err(e), Ok(())) => {
            warn!("response handler not removed: {e}");
            Err(StepError::Close(format!("remove response handler: {e}")))
        }
        (Ok(()), Ok(())) => Ok(()),
    }
}
