//! Turn a capture record into a direct URL plus the headers needed to GET it.
//!
//! The downloader only depends on [`ResolvedJobSpec`]; it does not know how
//! capture records are laid out.

use std::collections::BTreeMap;

use crate::capture::{filter_headers, CaptureRecord};
use crate::sniff::pick_best_candidate;

/// Minimal request specification needed by the downloader.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJobSpec {
    pub url: String,
    /// Allow-listed headers to send with the GET.
    pub headers: BTreeMap<String, String>,
}

/// Implemented by anything that can name one downloadable URL.
pub trait Resolver {
    /// `None` when there is nothing worth downloading.
    fn resolve(&self) -> Option<ResolvedJobSpec>;
}

impl Resolver for CaptureRecord {
    fn resolve(&self) -> Option<ResolvedJobSpec> {
        let url = pick_best_candidate(&self.candidates)?;
        Some(ResolvedJobSpec {
            url: url.to_string(),
            headers: filter_headers(&self.headers),
        })
    }
}
