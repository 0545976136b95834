//! Per-step failures of a browser session.
//!
//! None of these abort a capture; they are collected in a [`StepReport`]
//! and written to the operator log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("navigation to {url} failed: {reason}")]
    Navigate { url: String, reason: String },
    #[error("page interaction '{action}' failed: {reason}")]
    Interact { action: &'static str, reason: String },
    #[error("cookie harvest failed: {0}")]
    Harvest(String),
    #[error("closing browser failed: {0}")]
    Close(String),
    #[error("browser event stream closed before the wait ended")]
    EventsClosed,
}

/// Step failures collected over one session, in occurrence order.
#[derive(Debug, Default)]
pub struct StepReport {
    errors: Vec<StepError>,
}

impl StepReport {
    /// Record and log a step failure.
    pub fn record(&mut self, err: StepError) {
        tracing::warn!("{err}");
        self.errors.push(err);
    }

    /// Record the error half of a step result and pass the value through.
    pub fn check<T>(&mut self, result: Result<T, StepError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.record(e);
                None
            }
        }
    }

    pub fn errors(&self) -> &[StepError] {
        &self.errors
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
