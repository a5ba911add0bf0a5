//! Scripted collaborators for pipeline and client tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::retry::TransportFailure;
use crate::transport::{OverpassResponse, Transport};

use super::Sleeper;

pub(crate) type Reply = Result<OverpassResponse, TransportFailure>;

/// Transport that replays a fixed list of replies and records what it was sent.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    /// Per-call latency, consumed alongside replies; calls past the end return immediately.
    delays: Mutex<VecDeque<Duration>>,
    sent: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Like `new`, but call N waits `delays[N]` (on the tokio clock) before replying.
    pub(crate) fn with_delays(replies: Vec<Reply>, delays: Vec<Duration>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            delays: Mutex::new(delays.into()),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, query: &str) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(query.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply.unwrap_or_else(|| {
            Err(TransportFailure::Other {
                message: "script exhausted".to_string(),
            })
        })
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

pub(crate) fn ok(body: &str) -> Reply {
    Ok(OverpassResponse::new(body).with_content_type("application/json"))
}

pub(crate) fn status(code: u16) -> Reply {
    Err(TransportFailure::http(code, ""))
}

pub(crate) fn status_with_header(code: u16, name: &str, value: &str) -> Reply {
    let mut headers = HashMap::new();
    headers.insert(name.to_ascii_lowercase(), value.to_string());
    Err(TransportFailure::Http {
        status: code,
        status_text: None,
        headers,
        body: String::new(),
    })
}
