//! Legacy key-value cookie store kept next to the working directory for
//! scripts that talk to the shop without a browser.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use crate::browser::BrowserCookie;
use crate::storage;

/// Merge `last_appid`, `cookies_time` and a flat `cookies` map into the JSON
/// object at `path`. Other keys are preserved; a missing, unreadable or
/// non-object file counts as empty.
pub fn mirror_cookies(path: &Path, appid: &str, cookies: &[BrowserCookie], now: i64) -> Result<()> {
    let mut doc = match std::fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        Err(_) => Map::new(),
    };

    let flat: Map<String, Value> = cookies
        .iter()
        .map(|c| (c.name.clone(), Value::String(c.value.clone())))
        .collect();

    doc.insert("last_appid".into(), Value::String(appid.to_string()));
    doc.insert("cookies_time".into(), Value::from(now));
    doc.insert("cookies".into(), Value::Object(flat));

    let json = serde_json::to_vec_pretty(&Value::Object(doc)).context("serialize cookie mirror")?;
    storage::write_atomic(path, &json)
        .with_context(|| format!("write cookie mirror {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cookie(name: &str, value: &str) -> BrowserCookie {
        BrowserCookie {
            name: name.into(),
            value: value.into(),
            domain: ".xet.citv.cn".into(),
            path: "/".into(),
            expires: -1.0,
            http_only: false,
            secure: false,
        }
    }

    #[test]
    fn preserves_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, br#"{"keep": 1, "cookies": {"old": "x"}}"#).unwrap();

        mirror_cookies(&path, "app1", &[cookie("sid", "s1"), cookie("ko", "k")], 42).unwrap();

        let v: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(v["keep"], 1);
        assert_eq!(v["last_appid"], "app1");
        assert_eq!(v["cookies_time"], 42);
        assert_eq!(v["cookies"], json!({"sid": "s1", "ko": "k"}));
    }

    #[test]
    fn invalid_existing_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"[1, 2").unwrap();
        mirror_cookies(&path, "app2", &[], 7).unwrap();
        let v: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(v, json!({"last_appid": "app2", "cookies_time": 7, "cookies": {}}));
    }
}
