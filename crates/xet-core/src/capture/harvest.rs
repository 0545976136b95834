//! Cookie and header harvesting at the end of a session.

use std::collections::BTreeMap;

use crate::browser::BrowserCookie;
use crate::urls;

/// The only request headers a capture keeps and a download sends.
pub const HEADER_ALLOW_LIST: [&str; 5] = ["User-Agent", "Accept", "Referer", "Origin", "Cookie"];

/// Cookies and request headers taken from a finished session.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub cookies: Vec<BrowserCookie>,
    pub headers: BTreeMap<String, String>,
}

impl Harvest {
    pub fn build(page_url: &str, user_agent: &str, cookies: Vec<BrowserCookie>) -> Self {
        let host = urls::host_of(page_url).unwrap_or_default();
        let cookie_header = cookie_header_for_host(&cookies, &host);
        Harvest {
            headers: request_headers(page_url, user_agent, &cookie_header),
            cookies,
        }
    }
}

/// True when a cookie set for `cookie_domain` is sent to `host`: the domain
/// (leading dot ignored) equals the host or is a parent domain of it.
pub fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() || host.is_empty() {
        return false;
    }
    let host = host.to_ascii_lowercase();
    host == domain
        || host
            .strip_suffix(&domain)
            .is_some_and(|rest| rest.ends_with('.'))
}

/// `name=value; name=value` for every cookie scoped to `host`.
pub fn cookie_header_for_host(cookies: &[BrowserCookie], host: &str) -> String {
    cookies
        .iter()
        .filter(|c| domain_matches(&c.domain, host))
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Minimal headers that make the CDN accept a direct request.
pub fn request_headers(
    page_url: &str,
    user_agent: &str,
    cookie_header: &str,
) -> BTreeMap<String, String> {
    let origin = urls::origin_of(page_url).unwrap_or_default();
    BTreeMap::from([
        ("User-Agent".to_string(), user_agent.to_string()),
        ("Accept".to_string(), "*/*".to_string()),
        ("Referer".to_string(), page_url.to_string()),
        ("Origin".to_string(), origin),
        ("Cookie".to_string(), cookie_header.to_string()),
    ])
}

/// Drop everything outside [`HEADER_ALLOW_LIST`].
pub fn filter_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter(|(k, _)| HEADER_ALLOW_LIST.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, value: &str, domain: &str) -> BrowserCookie {
        BrowserCookie {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".into(),
            expires: -1.0,
            http_only: false,
            secure: true,
        }
    }

    #[test]
    fn domain_suffix_matching() {
        assert!(domain_matches(".xet.citv.cn", "app1.xet.citv.cn"));
        assert!(domain_matches("app1.xet.citv.cn", "app1.xet.citv.cn"));
        assert!(domain_matches("XET.citv.cn", "app1.xet.citv.cn"));
        assert!(!domain_matches("t.citv.cn", "app1.xet.citv.cn"));
        assert!(!domain_matches("other.cn", "app1.xet.citv.cn"));
        assert!(!domain_matches("", "app1.xet.citv.cn"));
    }

    #[test]
    fn cookie_header_keeps_only_scoped_cookies_in_order() {
        let cookies = vec![
            cookie("ko_token", "t1", ".xet.citv.cn"),
            cookie("tracker", "x", ".ads.example"),
            cookie("sid", "s2", "app1.xet.citv.cn"),
        ];
        assert_eq!(
            cookie_header_for_host(&cookies, "app1.xet.citv.cn"),
            "ko_token=t1; sid=s2"
        );
        assert_eq!(cookie_header_for_host(&cookies, "elsewhere.test"), "");
    }

    #[test]
    fn harvest_builds_all_allowed_headers() {
        let h = Harvest::build(
            "https://app1.xet.citv.cn/p/course/audio/a_1?product_id=p_1",
            "ua/1.0",
            vec![cookie("sid", "s", ".xet.citv.cn")],
        );
        assert_eq!(h.headers.len(), HEADER_ALLOW_LIST.len());
        assert_eq!(h.headers["User-Agent"], "ua/1.0");
        assert_eq!(h.headers["Accept"], "*/*");
        assert_eq!(
            h.headers["Referer"],
            "https://app1.xet.citv.cn/p/course/audio/a_1?product_id=p_1"
        );
        assert_eq!(h.headers["Origin"], "https://app1.xet.citv.cn");
        assert_eq!(h.headers["Cookie"], "sid=s");
        assert_eq!(h.cookies.len(), 1);
    }

    #[test]
    fn filter_drops_unknown_headers() {
        let mut headers = request_headers("https://a.test/x", "ua", "c=1");
        headers.insert("Authorization".into(), "Bearer x".into());
        headers.insert("cookie".into(), "lowercase".into());
        let filtered = filter_headers(&headers);
        assert_eq!(filtered.len(), 5);
        assert!(!filtered.contains_key("Authorization"));
        assert!(!filtered.contains_key("cookie"));
    }
}
