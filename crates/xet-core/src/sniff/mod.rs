//! Response sniffing: decide which intercepted responses carry a media URL
//! and which candidate is worth downloading.

mod matcher;
mod rank;

pub use matcher::{match_response, JSON_URL_KEYS, MEDIA_EXTENSIONS};
pub use rank::{pick_best_candidate, EXTENSION_PRIORITY};

use serde::{Deserialize, Serialize};

/// One network response observed by the browser, reduced to what the
/// sniffers need.
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptedResponse {
    pub url: String,
    /// Lowercased content type (mime type as reported by the browser).
    pub content_type: String,
    /// Parsed body, present only for JSON responses that could be read.
    pub body: Option<serde_json::Value>,
}

impl InterceptedResponse {
    pub fn new(url: impl Into<String>, content_type: impl AsRef<str>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.as_ref().to_ascii_lowercase(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_json(&self) -> bool {
        self.content_type.contains("application/json")
    }
}

/// How a candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// The response itself looked like media (extension or content type).
    Response,
    /// A JSON response carried the URL in a well-known field.
    JsonKey,
}

/// A URL that might be the real media asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "type")]
    pub kind: CandidateKind,
    /// URL of the response the candidate was observed in.
    #[serde(rename = "from")]
    pub source_url: String,
    pub url: String,
}

/// Append `candidate` unless its media URL is already present.
/// Returns true when it was added.
pub fn push_unique(candidates: &mut Vec<Candidate>, candidate: Candidate) -> bool {
    if candidates.iter().any(|c| c.url == candidate.url) {
        return false;
    }
    candidates.push(candidate);
    true
}
