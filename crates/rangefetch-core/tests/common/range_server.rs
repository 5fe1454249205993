//! Minimal HTTP/1.1 server that answers Range GETs for integration tests.
//!
//! Serves a single static body. A `Range: bytes=X-Y` GET gets 206 Partial
//! Content; a range starting at or past the end gets 206 with an empty body.
//! Options simulate throttled responses and failing requests, and every
//! received Range header is recorded.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy, Default)]
pub struct RangeServerOptions {
    /// Cap every response body at this many bytes (simulates short reads).
    pub max_chunk: Option<usize>,
    /// Answer the Nth GET (1-based) with this status line and the full body instead of 206.
    pub fail_request: Option<(usize, &'static str)>,
}

pub struct RangeServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl RangeServer {
    /// Range header values received so far, in arrival order.
    pub fn ranges(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body`. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = Arc::clone(&body);
                let requests = Arc::clone(&requests);
                let counter = Arc::clone(&counter);
                thread::spawn(move || handle(stream, &body, opts, &requests, &counter));
            }
        });
    }
    RangeServer {
        url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    requests: &Mutex<Vec<String>>,
    counter: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, range_value, range) = parse_request(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    requests.lock().unwrap().push(range_value.unwrap_or_default());
    let seq = counter.fetch_add(1, Ordering::SeqCst) + 1;

    let total = body.len() as u64;
    if let Some((nth, status)) = opts.fail_request {
        if nth == seq {
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.write_all(body);
            return;
        }
    }

    let (status, slice) = match range {
        Some((start, _)) if start >= total => ("206 Partial Content", &body[0..0]),
        Some((start, end_incl)) => {
            let start = start as usize;
            let mut end_excl = (end_incl.saturating_add(1)).min(total) as usize;
            if let Some(cap) = opts.max_chunk {
                end_excl = end_excl.min(start + cap);
            }
            let end_excl = end_excl.max(start);
            ("206 Partial Content", &body[start..end_excl])
        }
        None => ("200 OK", body),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
        status,
        slice.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

/// Returns (method, raw Range value, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, Option<String>, Option<(u64, u64)>) {
    let mut method = "";
    let mut raw = None;
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                raw = Some(value.to_string());
                if value.to_lowercase().starts_with("bytes=") {
                    let part = value[6..].trim();
                    if let Some((a, b)) = part.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim();
                        let end_incl = if end.is_empty() {
                            u64::MAX
                        } else {
                            end.parse::<u64>().unwrap_or(0)
                        };
                        range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    (method, raw, range)
}
