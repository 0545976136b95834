//! Minimal HTTP/1.1 server for download tests.
//!
//! Serves one static body for every GET. Responses follow a scripted status
//! sequence (the last status repeats) and every raw request is recorded so
//! tests can check which headers were sent.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MediaServerOptions {
    /// Status per request in order; the last one repeats. Empty means 200.
    pub statuses: Vec<u16>,
    /// Pause after the first half of a 2xx body.
    pub stall: Option<Duration>,
    pub content_type: &'static str,
}

impl Default for MediaServerOptions {
    fn default() -> Self {
        Self {
            statuses: vec![200],
            stall: None,
            content_type: "application/vnd.apple.mpegurl",
        }
    }
}

pub struct MediaServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MediaServer {
    /// Absolute URL for `path` (no leading slash).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn start(body: Vec<u8>) -> MediaServer {
    start_with_options(body, MediaServerOptions::default())
}

/// Starts the server on a background thread; it runs until the process exits.
pub fn start_with_options(body: Vec<u8>, opts: MediaServerOptions) -> MediaServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let counter = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &body, &opts, n, &log));
        }
    });
    MediaServer {
        base: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn status_for(opts: &MediaServerOptions, n: usize) -> u16 {
    opts.statuses
        .get(n)
        .or(opts.statuses.last())
        .copied()
        .unwrap_or(200)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: &MediaServerOptions,
    n: usize,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let len = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(len) => len,
    };
    let request = String::from_utf8_lossy(&buf[..len]).into_owned();
    let is_get = request.starts_with("GET ");
    log.lock().unwrap().push(request);
    if !is_get {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let status = status_for(opts, n);
    if !(200..300).contains(&status) {
        let msg = b"error";
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            reason(status),
            msg.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(msg);
        return;
    }

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        opts.content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    match opts.stall {
        Some(pause) => {
            let (first, rest) = body.split_at(body.len() / 2);
            let _ = stream.write_all(first);
            let _ = stream.flush();
            thread::sleep(pause);
            let _ = stream.write_all(rest);
        }
        None => {
            let _ = stream.write_all(body);
        }
    }
}

/// Value of header `name` in a raw request, if present.
pub fn header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
    request.lines().skip(1).find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}
