//! Terminal error type surfaced to callers of the query pipeline.

use thiserror::Error;

/// Fallback text for a non-2xx status that carried no reason phrase.
pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error occured";

/// Error returned by a query request.
///
/// One variant per failure kind so callers (and tests) can match on the kind
/// and its fields directly. Values are constructed once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverpassError {
    /// The server rejected the query as malformed (HTTP 400). Never retried.
    #[error("{}", bad_request_message(.details))]
    BadRequest { details: Vec<String> },

    /// The server asked us to slow down (HTTP 429).
    #[error("rate limited by server")]
    RateLimited { retry_after_ms: Option<u64> },

    /// The server is overloaded or failing (HTTP 500/502/503/504).
    #[error("server unavailable")]
    ServerUnavailable,

    /// No HTTP response was received (connect, DNS, reset).
    #[error("network failure: {message}")]
    NetworkFailure { message: String },

    /// Any other HTTP status, or a failure that did not come from the transport.
    #[error("HTTP {code}: {text}")]
    UnknownStatus { code: u16, text: String },

    /// The retry budget ran out on an otherwise retryable failure.
    #[error("{}", max_retries_message(.last_status))]
    MaxRetriesExceeded { last_status: Option<String> },
}

impl OverpassError {
    /// True for kinds that the retry loop treats as transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OverpassError::RateLimited { .. } | OverpassError::ServerUnavailable
        )
    }
}

fn bad_request_message(details: &[String]) -> String {
    if details.is_empty() {
        "bad request".to_string()
    } else {
        format!("bad request: {}", details.join("; "))
    }
}

fn max_retries_message(last_status: &Option<String>) -> String {
    match last_status {
        Some(status) => format!("Max retries exceeded: {}", status),
        None => "Max retries exceeded".to_string(),
    }
}
