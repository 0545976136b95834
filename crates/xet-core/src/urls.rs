//! Shop page URLs and id inference.

use url::Url;

/// Shop home URL from the configured template (`{appid}` placeholder).
pub fn shop_url(template: &str, appid: &str) -> String {
    template.replace("{appid}", appid).trim_end_matches('/').to_string()
}

/// Product (column) detail page. The platform addresses columns as a bare
/// query token: `/p/column/details?p_xxx`.
pub fn product_page_url(shop: &str, product_id: &str) -> String {
    format!("{}/p/column/details?{}", shop.trim_end_matches('/'), product_id)
}

/// Resource play page; `a_` ids are audio, everything else video.
pub fn resource_page_url(shop: &str, resource_id: &str, product_id: Option<&str>) -> String {
    let kind = if resource_id.starts_with("a_") {
        "audio"
    } else {
        "video"
    };
    let base = format!("{}/p/course/{}/{}", shop.trim_end_matches('/'), kind, resource_id);
    match product_id {
        Some(pid) => format!("{base}?anonymous=2&product_id={pid}"),
        None => base,
    }
}

/// Non-empty and made of word characters only, so also safe as a file stem.
pub(crate) fn is_word_tail(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// `id` is one of `prefixes` followed by at least one word character.
pub fn is_prefixed_id(id: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|p| id.strip_prefix(p).is_some_and(is_word_tail))
}

/// Resource id from a page URL: the first path segment that looks like
/// `a_<word>` or `v_<word>`.
pub fn resource_id_from_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    parsed
        .path_segments()?
        .find(|seg| {
            (seg.starts_with("a_") || seg.starts_with("v_")) && is_word_tail(&seg[2..])
        })
        .map(str::to_string)
}

/// Product id from a product page URL: the `product_id` query parameter, or
/// a bare `p_…` query token as produced by [`product_page_url`].
pub fn product_id_from_url(product_url: &str) -> Option<String> {
    let parsed = Url::parse(product_url).ok()?;
    if let Some((_, v)) = parsed
        .query_pairs()
        .find(|(k, v)| k == "product_id" && is_word_tail(v))
    {
        return Some(v.into_owned());
    }
    parsed
        .query_pairs()
        .find(|(k, v)| v.is_empty() && k.starts_with("p_") && is_word_tail(k))
        .map(|(k, _)| k.into_owned())
}

/// Host of a page URL (no port).
pub fn host_of(page_url: &str) -> Option<String> {
    Url::parse(page_url)
        .ok()?
        .host_str()
        .map(|h| h.to_ascii_lowercase())
}

/// `scheme://host[:port]` of a page URL.
pub fn origin_of(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
