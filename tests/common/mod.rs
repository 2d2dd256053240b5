//! Minimal HTTP/1.1 server for integration tests. One request per connection,
//! answered by a routing closure; every request line is recorded.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    /// Overrides the Content-Length header (HEAD responses only carry the header).
    pub content_length: Option<u64>,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.as_bytes().to_vec(),
            content_length: None,
        }
    }

    pub fn bytes(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            body,
            content_length: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            content_length: None,
        }
    }
}

pub struct TestServer {
    pub base: String,
    log: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl TestServer {
    /// Bind an ephemeral port and serve `route(method, path_and_query)` on a background thread.
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let log = Arc::new(Mutex::new(Vec::new()));
        let thread_log = Arc::clone(&log);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                if let Err(e) = serve_one(&stream, &route, &thread_log) {
                    eprintln!("test server error: {}", e);
                }
            }
        });
        Self {
            base: format!("http://{}", addr),
            log,
        }
    }

    /// API base for `ExportClient::builder().api_base(..)`.
    pub fn api_base(&self) -> String {
        format!("{}/api/1.0", self.base)
    }

    /// Recorded request lines, e.g. "GET /scrapers/export_sqlite/proj1/".
    pub fn requests(&self) -> Vec<String> {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .map(|(line, _)| line.clone())
            .collect()
    }

    /// Arrival time of every request, in order.
    pub fn arrivals(&self) -> Vec<Instant> {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn count(&self, method: &str, path_prefix: &str) -> usize {
        let prefix = format!("{} {}", method, path_prefix);
        self.requests()
            .iter()
            .filter(|r| r.starts_with(&prefix))
            .count()
    }
}

fn serve_one<F>(
    stream: &TcpStream,
    route: &F,
    log: &Mutex<Vec<(String, Instant)>>,
) -> std::io::Result<()>
where
    F: Fn(&str, &str) -> Reply,
{
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();
    log.lock()
        .expect("log lock")
        .push((format!("{} {}", method, target), Instant::now()));

    let reply = route(&method, &target);
    let reason = match reply.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let length = reply.content_length.unwrap_or(reply.body.len() as u64);
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status, reason, length
    );
    let mut writer = stream;
    writer.write_all(head.as_bytes())?;
    if method != "HEAD" {
        writer.write_all(&reply.body)?;
    }
    writer.flush()
}

/// Base URL on which nothing is listening.
pub fn closed_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    drop(listener);
    format!("http://{}", addr)
}
