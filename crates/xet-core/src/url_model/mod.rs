//! Output filename derivation for downloaded media.
//!
//! The stem comes from an explicit title or the resource id and is
//! sanitized; the extension comes from the media URL path.

mod path;
mod sanitize;

pub use path::{extension_from_url, filename_from_url_path, DEFAULT_EXTENSION};
pub use sanitize::{sanitize_filename, FALLBACK_NAME};

/// Derives `<stem>.<ext>` for a media URL.
///
/// Prefers `title`, then `resource_id`, then `"audio"` for the stem.
///
/// # Examples
///
/// - `derive_filename("https://cdn.example/x.m3u8", None, Some("a_123"))` → `"a_123.m3u8"`
/// - `derive_filename("https://cdn.example/play", Some("a/b"), None)` → `"a_b.mp3"`
pub fn derive_filename(url: &str, title: Option<&str>, resource_id: Option<&str>) -> String {
    let stem = title
        .filter(|t| !t.trim().is_empty())
        .or(resource_id.filter(|r| !r.trim().is_empty()))
        .unwrap_or(FALLBACK_NAME);
    format!("{}.{}", sanitize_filename(stem), extension_from_url(url))
}
