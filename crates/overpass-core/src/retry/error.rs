//! Failure reported by a transport for a single attempt.

use std::collections::HashMap;
use std::fmt;

/// Error returned by one `Transport::send` call (HTTP error, no response, or local failure).
/// Kept separate from `OverpassError` so the classifier can decide retries first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// A response arrived with a non-2xx status.
    Http {
        status: u16,
        /// Reason phrase from the status line, if the server sent one.
        status_text: Option<String>,
        /// Response headers, names lower-cased.
        headers: HashMap<String, String>,
        body: String,
    },
    /// No HTTP response was received (connect, DNS, reset, timeout).
    Connection { message: String },
    /// Failure not attributable to the network (e.g. worker thread panicked).
    Other { message: String },
}

impl TransportFailure {
    /// Convenience constructor for an HTTP failure without headers.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        TransportFailure::Http {
            status,
            status_text: None,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// HTTP status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            TransportFailure::Http { headers, .. } => headers
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            _ => None,
        }
    }

    /// "503 Service Unavailable" style text, when a response was received.
    pub fn status_line(&self) -> Option<String> {
        match self {
            TransportFailure::Http {
                status,
                status_text: Some(text),
                ..
            } => Some(format!("{} {}", status, text)),
            TransportFailure::Http { status, .. } => Some(format!("HTTP {}", status)),
            _ => None,
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Http {
                status,
                status_text,
                ..
            } => match status_text {
                Some(text) => write!(f, "HTTP {} {}", status, text),
                None => write!(f, "HTTP {}", status),
            },
            TransportFailure::Connection { message } => write!(f, "connection: {}", message),
            TransportFailure::Other { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for TransportFailure {}
