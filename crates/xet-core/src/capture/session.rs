//! The single-pass capture state machine shared by media and listing
//! captures.

use anyhow::{Context, Result};
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::harvest::Harvest;
use crate::browser::{BrowserEngine, LaunchSpec, PageDriver};
use crate::error::{StepError, StepReport};
use crate::sniff::InterceptedResponse;

/// Consumes intercepted responses and decides what counts as a signal.
pub trait Sniffer {
    /// Returns the number of new signals found in `resp`.
    fn observe(&mut self, resp: &InterceptedResponse) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Navigate,
    WaitForSignal,
    Harvest,
    Persist,
    Close,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Navigate => "navigate",
            Stage::WaitForSignal => "wait_for_signal",
            Stage::Harvest => "harvest",
            Stage::Persist => "persist",
            Stage::Close => "close",
        };
        f.write_str(s)
    }
}

/// Parameters of one session.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub url: String,
    pub launch: LaunchSpec,
    /// Overall deadline for WAIT_FOR_SIGNAL.
    pub wait: Duration,
    pub poll_interval: Duration,
    /// Quiet time after the last signal before the wait ends early.
    pub settle: Duration,
    /// Scroll distance per idle tick.
    pub scroll_delta: i64,
    /// Delay before the play interaction; `None` skips interaction.
    pub interaction: Option<Duration>,
    /// Pause between the synthetic play click and the explicit `play()` call.
    pub click_settle: Duration,
    pub user_agent: String,
}

/// Result of a finished session.
#[derive(Debug)]
pub struct SessionOutput<T> {
    pub value: T,
    pub report: StepReport,
    pub harvest: Harvest,
    pub signals: usize,
}

#[derive(Default)]
struct WaitState {
    signals: usize,
    last_signal: Option<Instant>,
}

impl WaitState {
    fn feed<S: Sniffer>(&mut self, sniffer: &mut S, resp: &InterceptedResponse) {
        let n = sniffer.observe(resp);
        if n > 0 {
            debug!(url = %resp.url, new = n, "signal");
            self.signals += n;
            self.last_signal = Some(Instant::now());
        }
    }
}

/// Feed events to `sniffer` until `until`. Returns false once every sender
/// is gone.
fn pump<S: Sniffer>(
    rx: &Receiver<InterceptedResponse>,
    sniffer: &mut S,
    state: &mut WaitState,
    until: Instant,
) -> bool {
    loop {
        let remaining = until.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(resp) => state.feed(sniffer, &resp),
            Err(RecvTimeoutError::Timeout) => return true,
            Err(RecvTimeoutError::Disconnected) => return false,
        }
    }
}

fn wait_for_signal<P: PageDriver, S: Sniffer>(
    page: &mut P,
    rx: &Receiver<InterceptedResponse>,
    plan: &SessionPlan,
    sniffer: &mut S,
    report: &mut StepReport,
) -> usize {
    let deadline = Instant::now() + plan.wait;
    let mut state = WaitState::default();
    let mut connected = true;

    if let Some(delay) = plan.interaction {
        connected = pump(rx, sniffer, &mut state, (Instant::now() + delay).min(deadline));
        report.check(page.click_play());
        if connected {
            connected = pump(rx, sniffer, &mut state, (Instant::now() + plan.click_settle).min(deadline));
        }
        report.check(page.play_media());
    }

    while connected {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        connected = pump(rx, sniffer, &mut state, (now + plan.poll_interval).min(deadline));
        match state.last_signal {
            Some(last) if last.elapsed() >= plan.settle => break,
            Some(_) => {}
            None => {
                report.check(page.scroll_by(plan.scroll_delta));
            }
        }
    }

    if !connected {
        report.record(StepError::EventsClosed);
    }

    // Responses that arrived after the last tick still count.
    for resp in rx.try_iter() {
        state.feed(sniffer, &resp);
    }

    if state.signals == 0 {
        info!(wait_secs = plan.wait.as_secs_f64(), "no signal before deadline");
    }
    state.signals
}

/// Run NAVIGATE → WAIT_FOR_SIGNAL → HARVEST → PERSIST → CLOSE once.
///
/// Only a browser launch failure or a `persist` error is returned as `Err`;
/// every other step failure lands in the report.
pub fn run_session<E, S, T, F>(
    engine: &E,
    plan: &SessionPlan,
    sniffer: &mut S,
    persist: F,
) -> Result<SessionOutput<T>>
where
    E: BrowserEngine,
    S: Sniffer,
    F: FnOnce(&S, &Harvest) -> Result<T>,
{
    let (tx, rx) = mpsc::channel();
    let mut page = engine
        .launch(&plan.launch, tx)
        .with_context(|| format!("launch browser for {}", plan.url))?;
    let mut report = StepReport::default();

    info!(stage = %Stage::Navigate, url = %plan.url);
    report.check(page.navigate(&plan.url));

    debug!(stage = %Stage::WaitForSignal, wait_secs = plan.wait.as_secs_f64());
    let signals = wait_for_signal(&mut page, &rx, plan, sniffer, &mut report);

    debug!(stage = %Stage::Harvest, signals);
    let cookies = report.check(page.cookies()).unwrap_or_default();
    let harvest = Harvest::build(&plan.url, &plan.user_agent, cookies);

    debug!(stage = %Stage::Persist);
    let persisted = persist(sniffer, &harvest);

    debug!(stage = %Stage::Close);
    report.check(page.close());
    drop(rx);

    let value = persisted?;
    Ok(SessionOutput {
        value,
        report,
        harvest,
        signals,
    })
}
