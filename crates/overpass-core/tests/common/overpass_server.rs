//! Minimal HTTP/1.1 server that replays scripted responses for integration tests.
//!
//! Each accepted request consumes the next scripted reply (the last one repeats
//! once the script runs out). Request bodies are recorded for assertions.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, reason: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

#[derive(Clone)]
pub struct ServerHandle {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ServerHandle {
    /// Raw request bodies received so far.
    pub fn request_bodies(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Starts a server in a background thread. Returns its interpreter URL
/// (e.g. "http://127.0.0.1:12345/api/interpreter"). Runs until the process exits.
pub fn start(script: Vec<Reply>) -> ServerHandle {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let script = Arc::new(Mutex::new(script));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let reply = {
                let mut s = script.lock().unwrap();
                if s.len() > 1 {
                    s.remove(0)
                } else {
                    s[0].clone()
                }
            };
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, reply, &recorded));
        }
    });
    ServerHandle {
        url: format!("http://127.0.0.1:{}/api/interpreter", port),
        requests,
    }
}

/// A URL on which nothing is listening.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/interpreter", port)
}

fn handle(mut stream: TcpStream, reply: Reply, recorded: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let body = match read_request_body(&mut stream) {
        Some(b) => b,
        None => return,
    };
    recorded.lock().unwrap().push(body);

    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.reason,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(&reply.body);
    let _ = stream.write_all(response.as_bytes());
}

fn read_request_body(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).into_owned();
        if let Some(split) = text.find("\r\n\r\n") {
            let head = &text[..split];
            let content_length = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let body = &text[split + 4..];
            if body.len() >= content_length {
                return Some(body[..content_length].to_string());
            }
        }
    }
}

/// Starts a server that reads the request and never answers. The receiver
/// yields once the client closes the connection (read returns EOF or errors).
pub fn start_stalling() -> (String, mpsc::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let (closed_tx, closed_rx) = mpsc::channel();
    thread::spawn(move || {
        if let Some(mut stream) = listener.incoming().flatten().next() {
            let _ = read_request_body(&mut stream);
            let mut buf = [0u8; 256];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => continue,
                }
            }
            let _ = closed_tx.send(());
        }
    });
    (format!("http://127.0.0.1:{}/api/interpreter", port), closed_rx)
}
