//! Browser capture sessions.
//!
//! A session walks NAVIGATE → WAIT_FOR_SIGNAL → HARVEST → PERSIST → CLOSE
//! once. Resource captures sniff media URLs; listing captures collect
//! catalog entities. Both persist an immutable JSON record per run.

mod harvest;
mod listing;
mod media;
mod mirror;
mod record;
mod session;

pub use harvest::{
    cookie_header_for_host, domain_matches, filter_headers, request_headers, Harvest,
    HEADER_ALLOW_LIST,
};
pub use listing::{
    capture_products, capture_resources, effective_product_id, EntitySniffer, ListingOutcome,
};
pub use media::{capture_resource, CaptureOutcome, MediaSniffer, ResourceCapture};
pub use mirror::mirror_cookies;
pub use record::{CaptureRecord, ListingRecord};
pub use session::{run_session, SessionOutput, SessionPlan, Sniffer, Stage};

/// Fallback key when no resource id can be determined.
pub const UNKNOWN_RESOURCE: &str = "unknown_resource";

/// Fallback key when no product id can be determined.
pub const UNKNOWN_PRODUCT: &str = "unknown_product";

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
