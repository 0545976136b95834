//! Scripted browser for capture tests.
//!
//! Responses are attached to URL prefixes and delivered when the page
//! navigates to a matching URL, or when playback is triggered. A response
//! with a delay is sent from its own thread that long after the trigger.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use xet_core::browser::{BrowserCookie, BrowserEngine, LaunchSpec, PageDriver};
use xet_core::error::StepError;
use xet_core::sniff::InterceptedResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Navigate,
    Play,
}

#[derive(Debug, Clone)]
struct Scripted {
    prefix: String,
    trigger: Trigger,
    delay: Duration,
    response: InterceptedResponse,
}

#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    script: Vec<Scripted>,
    cookies: Vec<BrowserCookie>,
    pub fail_launch: bool,
    pub fail_navigate: bool,
    pub fail_cookies: bool,
    /// Drop the event sender right after navigation.
    pub close_events_on_navigate: bool,
    actions: Arc<Mutex<Vec<String>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_script(mut self, prefix: &str, trigger: Trigger, delay: Duration, response: InterceptedResponse) -> Self {
        self.script.push(Scripted {
            prefix: prefix.to_string(),
            trigger,
            delay,
            response,
        });
        self
    }

    pub fn on_navigate(self, prefix: &str, response: InterceptedResponse) -> Self {
        self.push_script(prefix, Trigger::Navigate, Duration::ZERO, response)
    }

    /// Like `on_navigate`, but the response arrives `delay` after navigation.
    pub fn on_navigate_after(self, prefix: &str, delay: Duration, response: InterceptedResponse) -> Self {
        self.push_script(prefix, Trigger::Navigate, delay, response)
    }

    pub fn on_play(self, prefix: &str, response: InterceptedResponse) -> Self {
        self.push_script(prefix, Trigger::Play, Duration::ZERO, response)
    }

    pub fn with_cookie(mut self, name: &str, value: &str, domain: &str) -> Self {
        self.cookies.push(BrowserCookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            expires: -1.0,
            http_only: true,
            secure: true,
        });
        self
    }

    /// Every page action so far, e.g. `launch`, `navigate <url>`, `scroll 800`.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn log(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

pub struct FakePage {
    engine: FakeEngine,
    events: Option<Sender<InterceptedResponse>>,
    url: Option<String>,
}

impl FakePage {
    fn deliver(&mut self, trigger: Trigger) {
        let (Some(url), Some(tx)) = (self.url.as_ref(), self.events.as_ref()) else {
            return;
        };
        for s in &self.engine.script {
            if s.trigger != trigger || !url.starts_with(&s.prefix) {
                continue;
            }
            if s.delay.is_zero() {
                let _ = tx.send(s.response.clone());
            } else {
                let (tx, delay, resp) = (tx.clone(), s.delay, s.response.clone());
                thread::spawn(move || {
                    thread::sleep(delay);
                    let _ = tx.send(resp);
                });
            }
        }
    }
}

impl BrowserEngine for FakeEngine {
    type Page = FakePage;

    fn launch(
        &self,
        spec: &LaunchSpec,
        events: Sender<InterceptedResponse>,
    ) -> anyhow::Result<FakePage> {
        if self.fail_launch {
            anyhow::bail!("no browser binary");
        }
        self.log(format!("launch {}", spec.profile_dir.display()));
        Ok(FakePage {
            engine: self.clone(),
            events: Some(events),
            url: None,
        })
    }
}

impl PageDriver for FakePage {
    fn navigate(&mut self, url: &str) -> Result<(), StepError> {
        self.engine.log(format!("navigate {url}"));
        if self.engine.fail_navigate {
            return Err(StepError::Navigate {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.url = Some(url.to_string());
        self.deliver(Trigger::Navigate);
        if self.engine.close_events_on_navigate {
            self.events = None;
        }
        Ok(())
    }

    fn click_play(&mut self) -> Result<(), StepError> {
        self.engine.log("click_play".to_string());
        Ok(())
    }

    fn play_media(&mut self) -> Result<(), StepError> {
        self.engine.log("play_media".to_string());
        self.deliver(Trigger::Play);
        Ok(())
    }

    fn scroll_by(&mut self, delta_y: i64) -> Result<(), StepError> {
        self.engine.log(format!("scroll {delta_y}"));
        Ok(())
    }

    fn cookies(&mut self) -> Result<Vec<BrowserCookie>, StepError> {
        if self.engine.fail_cookies {
            return Err(StepError::Harvest("target closed".to_string()));
        }
        Ok(self.engine.cookies.clone())
    }

    fn close(mut self) -> Result<(), StepError> {
        self.engine.log("close".to_string());
        self.events = None;
        Ok(())
    }
}
