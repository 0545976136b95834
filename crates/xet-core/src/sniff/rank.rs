use super::Candidate;

/// Manifest first, then common audio codecs.
pub const EXTENSION_PRIORITY: &[&str] = &[".m3u8", ".m4a", ".mp3", ".aac", ".flac"];

/// Pick the download URL: the first candidate containing the
/// highest-priority extension, else the first candidate. No bitrate or
/// quality awareness.
pub fn pick_best_candidate(candidates: &[Candidate]) -> Option<&str> {
    EXTENSION_PRIORITY
        .iter()
        .find_map(|ext| candidates.iter().find(|c| c.url.contains(ext)))
        .or_else(|| candidates.first())
        .map(|c| c.url.as_str())
}
