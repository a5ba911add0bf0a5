//! Parse HTTP response header lines collected by curl.

use std::collections::HashMap;

/// Status line reason phrase and headers of the final response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status_text: Option<String>,
    /// Header names lower-cased.
    pub headers: HashMap<String, String>,
}

/// Parse collected header lines into a ResponseHead.
///
/// Curl reports the headers of every response it saw (redirects, `100 Continue`),
/// so a new status line discards what came before it.
pub(crate) fn parse_response_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead {
                status_text: parse_reason_phrase(line),
                headers: HashMap::new(),
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            head.headers
                .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    head
}

/// "HTTP/1.1 503 Service Unavailable" -> "Service Unavailable". HTTP/2 has none.
fn parse_reason_phrase(status_line: &str) -> Option<String> {
    let mut parts = status_line.splitn(3, ' ');
    parts.next()?;
    parts.next()?;
    let reason = parts.next()?.trim();
    if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_status_text_and_headers() {
        let head = parse_response_head(&lines(&[
            "HTTP/1.1 429 Too Many Requests",
            "Retry-After: 3",
            "Content-Type: text/html; charset=utf-8",
        ]));
        assert_eq!(head.status_text.as_deref(), Some("Too Many Requests"));
        assert_eq!(head.headers.get("retry-after").map(String::as_str), Some("3"));
        assert_eq!(
            head.headers.get("content-type").map(String::as_str),
            Some("text/html; charset=utf-8")
        );
    }

    #[test]
    fn later_status_line_replaces_earlier_response() {
        let head = parse_response_head(&lines(&[
            "HTTP/1.1 100 Continue",
            "",
            "HTTP/1.1 200 OK",
            "Content-Type: application/json",
        ]));
        assert_eq!(head.status_text.as_deref(), Some("OK"));
        assert_eq!(head.headers.len(), 1);
    }

    #[test]
    fn http2_status_line_has_no_reason() {
        let head = parse_response_head(&lines(&["HTTP/2 504", "server: nginx"]));
        assert!(head.status_text.is_none());
        assert_eq!(head.headers.get("server").map(String::as_str), Some("nginx"));
    }
}
