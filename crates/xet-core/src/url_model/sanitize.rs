//! Cross-platform filename sanitization for media titles.

/// Characters rejected by at least one common filesystem.
const UNSAFE: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Longest name we emit, in bytes (Linux NAME_MAX minus room for an extension).
const NAME_MAX: usize = 240;

/// Fallback used when nothing printable is left.
pub const FALLBACK_NAME: &str = "audio";

/// Sanitizes a title or id for use as a file stem.
///
/// - Replaces `\ / : * ? " < > |`, NUL and control characters with `_`
/// - Trims surrounding whitespace and trailing dots
/// - Truncates to a safe byte length on a char boundary
/// - Returns `"audio"` when the result would be empty or a dot-name
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| {
            if UNSAFE.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches('.').trim_end();

    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let out = trimmed[..take].trim_end();

    if out.is_empty() || out.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        out.to_string()
    }
}
