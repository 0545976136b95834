//! Retry and backoff policy for media downloads.
//!
//! Classifies transport failures (timeouts, throttling, connection errors)
//! and applies exponential backoff so a flaky CDN does not fail a whole
//! batch on the first hiccup. HTTP 4xx is never retried.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
