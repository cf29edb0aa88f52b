//! Minimal HTTP/1.1 server with canned per-path responses for integration tests.
//!
//! Answers GET only. Each request target (path plus query) maps to a status
//! and body; unknown targets answer 404. Every request is counted so tests
//! can assert which URLs were (not) fetched.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Response {
    status: u16,
    body: Vec<u8>,
}

/// Route table built before the server starts.
#[derive(Debug, Default, Clone)]
pub struct Routes {
    map: HashMap<String, Response>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// `target` is the request path with query, e.g. `/api/mods/foo/full`.
    pub fn ok(mut self, target: &str, body: impl Into<Vec<u8>>) -> Self {
        self.map.insert(
            target.to_string(),
            Response {
                status: 200,
                body: body.into(),
            },
        );
        self
    }

    pub fn status(mut self, target: &str, status: u16) -> Self {
        self.map.insert(
            target.to_string(),
            Response {
                status,
                body: Vec::new(),
            },
        );
        self
    }
}

/// Running server. Lives until the process exits.
pub struct RegistryServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl RegistryServer {
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:12345`.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, target: &str) -> String {
        format!("{}{}", self.base, target)
    }

    pub fn hits(&self, target: &str) -> usize {
        self.hits.lock().unwrap().get(target).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

/// Starts a server in a background thread serving `routes`.
pub fn start(routes: Routes) -> RegistryServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    RegistryServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &Routes,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
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
    let (method, target) = parse_request_line(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(
            b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }
    *hits.lock().unwrap().entry(target.to_string()).or_default() += 1;

    let (status, body) = match routes.map.get(target) {
        Some(r) => (r.status, r.body.as_slice()),
        None => (404, &b"{\"message\":\"not found\"}"[..]),
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

/// (method, request target) from the first line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let line = request.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");
    (method, target)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
