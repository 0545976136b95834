//! Extension inference from the media URL path.

/// Extension used when the URL's last path segment has none.
pub const DEFAULT_EXTENSION: &str = "mp3";

/// Extracts the last path segment from a URL, ignoring query and fragment.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Extension of the URL's last path segment (text after its last `.`),
/// or `mp3` when the segment has no usable extension.
pub fn extension_from_url(url: &str) -> String {
    filename_from_url_path(url)
        .and_then(|segment| {
            let (_, ext) = segment.rsplit_once('.')?;
            let ext = ext.trim();
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                None
            } else {
                Some(ext.to_ascii_lowercase())
            }
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
