//! Classify transport failures into retry decisions.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{OverpassError, UNKNOWN_ERROR_TEXT};
use crate::retry::error::TransportFailure;
use crate::retry::policy::{backoff_delay, RetryDecision};

/// `Error</strong>: <text></p>` markers in the server's HTML error page.
static ERROR_DETAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Error</strong>:\s*(.*?)\s*</").expect("Failed to compile error detail regex")
});

/// Decide what to do after attempt `attempt` (0-based) failed.
///
/// Precedence: budget check first (for every failure kind), then the status
/// code, then connection-level and non-transport failures.
pub fn classify(
    failure: &TransportFailure,
    attempt: u32,
    max_retries: u32,
    query: &str,
) -> RetryDecision {
    if attempt >= max_retries {
        return RetryDecision::Exhausted(OverpassError::MaxRetriesExceeded {
            last_status: failure.status_line(),
        });
    }

    match failure {
        TransportFailure::Http {
            status,
            status_text,
            body,
            ..
        } => match *status {
            400 => {
                let details = extract_error_details(body);
                tracing::debug!(?details, query, "query rejected by server");
                RetryDecision::Fatal(OverpassError::BadRequest { details })
            }
            429 => {
                let retry_after_ms = failure.header("retry-after").and_then(parse_retry_after_ms);
                let delay = match retry_after_ms {
                    Some(ms) => Duration::from_millis(ms),
                    None => backoff_delay(attempt),
                };
                RetryDecision::RetryAfter {
                    delay,
                    cause: OverpassError::RateLimited { retry_after_ms },
                }
            }
            500 | 502 | 503 | 504 => RetryDecision::RetryAfter {
                delay: backoff_delay(attempt),
                cause: OverpassError::ServerUnavailable,
            },
            code => RetryDecision::Fatal(OverpassError::UnknownStatus {
                code,
                text: status_text
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_ERROR_TEXT.to_string()),
            }),
        },
        TransportFailure::Connection { message } => {
            RetryDecision::Fatal(OverpassError::NetworkFailure {
                message: message.clone(),
            })
        }
        TransportFailure::Other { message } => RetryDecision::Fatal(OverpassError::UnknownStatus {
            code: 0,
            text: message.clone(),
        }),
    }
}

/// Seconds from a `retry-after` header, converted to milliseconds.
/// Anything other than a non-negative integer is ignored.
fn parse_retry_after_ms(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()?.checked_mul(1000)
}

/// All error messages embedded in a 400 response body, with `&quot;` decoded.
/// Markers with no text after them are skipped.
pub fn extract_error_details(body: &str) -> Vec<String> {
    ERROR_DETAIL_PATTERN
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .filter(|m| !m.as_str().is_empty())
        .map(|m| m.as_str().replace("&quot;", "\""))
        .collect()
}
