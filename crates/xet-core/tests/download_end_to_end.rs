//! Downloader against a local HTTP server.

mod common;

use common::media_server::{self, MediaServerOptions};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use xet_core::capture::CaptureRecord;
use xet_core::download::Downloader;
use xet_core::retry::RetryPolicy;
use xet_core::sniff::{Candidate, CandidateKind};
use xet_core::storage::temp_path;

fn record(resource_id: &str, urls: &[String]) -> CaptureRecord {
    CaptureRecord {
        appid: "app1".into(),
        resource_id: resource_id.into(),
        page_url: format!("https://app1.xet.citv.cn/p/course/audio/{resource_id}"),
        headers: BTreeMap::from([
            ("User-Agent".to_string(), "xet-test".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
            ("Referer".to_string(), "https://app1.xet.citv.cn/p/course/audio/a_123".to_string()),
            ("Origin".to_string(), "https://app1.xet.citv.cn".to_string()),
            ("Cookie".to_string(), "ko_token=t1".to_string()),
            ("X-Leak".to_string(), "nope".to_string()),
        ]),
        cookies: vec![],
        candidates: urls
            .iter()
            .map(|u| Candidate {
                kind: CandidateKind::Response,
                source_url: u.clone(),
                url: u.clone(),
            })
            .collect(),
        captured_at: 0,
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(10),
    }
}

fn downloader(root: &Path) -> Downloader {
    let cfg = common::test_config(root);
    Downloader::new(&cfg, &cfg.download_dir).with_retry(fast_retry())
}

fn dir_entries(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn manifest_capture_downloads_after_full_body() {
    let body: Vec<u8> = b"#EXTM3U\n".iter().copied().cycle().take(64 * 1024).collect();
    let server = media_server::start_with_options(
        body.clone(),
        MediaServerOptions {
            stall: Some(Duration::from_millis(400)),
            ..MediaServerOptions::default()
        },
    );
    let root = tempdir().unwrap();
    let dl = downloader(root.path());
    let capture_path = root.path().join("captured/app1/a_123.json");
    record(
        "a_123",
        &[server.url("seg/64k.mp3"), server.url("hls/x.m3u8?sign=1")],
    )
    .save(&capture_path)
    .unwrap();

    let dest = dl.download_dir().join("a_123.m3u8");
    let handle = {
        let dl = dl.clone();
        let capture_path = capture_path.clone();
        std::thread::spawn(move || dl.download_from_capture(&capture_path, None))
    };
    std::thread::sleep(Duration::from_millis(150));
    assert!(!dest.exists(), "final file must not appear mid-transfer");

    let out = handle.join().unwrap().unwrap();
    assert_eq!(out.as_deref(), Some(dest.as_path()));
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert!(!temp_path(&dest).exists());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /hls/x.m3u8?sign=1 "));
    assert_eq!(media_server::header(&requests[0], "Cookie"), Some("ko_token=t1"));
    assert_eq!(media_server::header(&requests[0], "Origin"), Some("https://app1.xet.citv.cn"));
    assert_eq!(media_server::header(&requests[0], "X-Leak"), None);
}

#[test]
fn title_names_the_output_file() {
    let server = media_server::start(b"ID3audio".to_vec());
    let root = tempdir().unwrap();
    let dl = downloader(root.path());

    let out = dl
        .download(&record("a_5", &[server.url("media/track")]), Some("第1讲: a/b"))
        .unwrap()
        .unwrap();
    assert_eq!(out.file_name().unwrap().to_string_lossy(), "第1讲_ a_b.mp3");
    assert_eq!(std::fs::read(&out).unwrap(), b"ID3audio");
}

#[test]
fn http_404_fails_without_retry_or_output() {
    let server = media_server::start_with_options(
        b"never".to_vec(),
        MediaServerOptions {
            statuses: vec![404],
            ..MediaServerOptions::default()
        },
    );
    let root = tempdir().unwrap();
    let dl = downloader(root.path());

    let err = dl
        .download(&record("a_1", &[server.url("gone.m4a")]), None)
        .unwrap_err();
    assert!(format!("{err:#}").contains("HTTP 404"));
    assert_eq!(server.requests().len(), 1);
    assert!(dir_entries(dl.download_dir()).is_empty());
}

#[test]
fn throttled_response_is_retried() {
    let server = media_server::start_with_options(
        b"payload".to_vec(),
        MediaServerOptions {
            statuses: vec![503, 200],
            ..MediaServerOptions::default()
        },
    );
    let root = tempdir().unwrap();
    let dl = downloader(root.path());

    let out = dl
        .download(&record("a_2", &[server.url("a.aac")]), None)
        .unwrap()
        .unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), b"payload");
    assert_eq!(server.requests().len(), 2);
    assert_eq!(dir_entries(dl.download_dir()), vec!["a_2.aac".to_string()]);
}

#[test]
fn empty_candidates_produce_no_file() {
    let root = tempdir().unwrap();
    let dl = downloader(root.path());
    let capture_path = root.path().join("a_1.json");
    record("a_1", &[]).save(&capture_path).unwrap();

    assert_eq!(dl.download_from_capture(&capture_path, None).unwrap(), None);
    assert!(dir_entries(dl.download_dir()).is_empty());
}

#[test]
fn missing_capture_file_is_not_an_error() {
    let root = tempdir().unwrap();
    let dl = downloader(root.path());
    let out = dl
        .download_from_capture(&root.path().join("captured/app1/a_404.json"), None)
        .unwrap();
    assert_eq!(out, None);
}
