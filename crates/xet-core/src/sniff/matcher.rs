use super::{Candidate, CandidateKind, InterceptedResponse};

/// URL substrings that mark a response as media.
pub const MEDIA_EXTENSIONS: &[&str] = &[".m3u8", ".mp3", ".m4a", ".aac", ".flac"];

/// Content-type fragments for audio and streaming manifests.
const MEDIA_CONTENT_TYPES: &[&str] = &["audio/", "mpegurl", "m3u8"];

/// JSON fields the platform uses to hand out playable URLs.
pub const JSON_URL_KEYS: &[&str] = &[
    "audio_url",
    "audioUrl",
    "play_url",
    "playUrl",
    "hls_url",
    "hlsUrl",
];

/// Decide whether one response is a media candidate.
///
/// The response URL wins when it (or the content type) looks like media;
/// otherwise a JSON object body is checked for the first known URL field.
pub fn match_response(resp: &InterceptedResponse) -> Option<Candidate> {
    let url_is_media = MEDIA_EXTENSIONS.iter().any(|ext| resp.url.contains(ext));
    let type_is_media = MEDIA_CONTENT_TYPES
        .iter()
        .any(|t| resp.content_type.contains(t));

    if url_is_media || type_is_media {
        return Some(Candidate {
            kind: CandidateKind::Response,
            source_url: resp.url.clone(),
            url: resp.url.clone(),
        });
    }

    if !resp.is_json() {
        return None;
    }
    let object = resp.body.as_ref()?.as_object()?;
    JSON_URL_KEYS.iter().find_map(|key| {
        object.get(*key).and_then(|v| v.as_str()).map(|url| Candidate {
            kind: CandidateKind::JsonKey,
            source_url: resp.url.clone(),
            url: url.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn media_extension_in_url() {
        let r = InterceptedResponse::new("https://cdn.example/a/index.m3u8?sign=1", "text/plain");
        let c = match_response(&r).unwrap();
        assert_eq!(c.kind, CandidateKind::Response);
        assert_eq!(c.url, r.url);
        assert_eq!(c.source_url, r.url);
    }

    #[test]
    fn audio_content_type() {
        let r = InterceptedResponse::new("https://cdn.example/stream?id=1", "Audio/MPEG");
        assert!(match_response(&r).is_some());
        let r = InterceptedResponse::new("https://cdn.example/live", "application/vnd.apple.mpegurl");
        assert!(match_response(&r).is_some());
    }

    #[test]
    fn json_key_candidate() {
        let r = InterceptedResponse::new("https://api.example/detail", "application/json; charset=utf-8")
            .with_body(json!({"code": 0, "play_url": "https://cdn.example/x.mp3", "hls_url": "https://cdn.example/x.m3u8"}));
        let c = match_response(&r).unwrap();
        assert_eq!(c.kind, CandidateKind::JsonKey);
        assert_eq!(c.source_url, "https://api.example/detail");
        // first key in the fixed order wins
        assert_eq!(c.url, "https://cdn.example/x.mp3");
    }

    #[test]
    fn json_key_must_be_string_at_top_level() {
        let nested = InterceptedResponse::new("https://api.example/d", "application/json")
            .with_body(json!({"data": {"audio_url": "https://cdn.example/x.mp3"}}));
        assert!(match_response(&nested).is_none());

        let not_string = InterceptedResponse::new("https://api.example/d", "application/json")
            .with_body(json!({"audio_url": null, "playUrl": 3}));
        assert!(match_response(&not_string).is_none());

        let array = InterceptedResponse::new("https://api.example/d", "application/json")
            .with_body(json!([{"audio_url": "https://cdn.example/x.mp3"}]));
        assert!(match_response(&array).is_none());
    }

    #[test]
    fn json_body_ignored_for_non_json_type() {
        let r = InterceptedResponse::new("https://api.example/d", "text/html")
            .with_body(json!({"audio_url": "https://cdn.example/x.mp3"}));
        assert!(match_response(&r).is_none());
    }

    #[test]
    fn unrelated_response() {
        let r = InterceptedResponse::new("https://shop.example/logo.png", "image/png");
        assert!(match_response(&r).is_none());
    }
}
