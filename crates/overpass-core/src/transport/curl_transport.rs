//! libcurl-backed transport: POST the query as a form field to the interpreter.

use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use super::parse::parse_response_head;
use super::{OverpassResponse, Transport};
use crate::retry::TransportFailure;

const DEFAULT_USER_AGENT: &str = concat!("overpass-core/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Added on top of the query's server-side timeout so the server gets to answer first.
const TIMEOUT_GRACE: Duration = Duration::from_secs(15);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Transport that performs one blocking libcurl POST per attempt on the blocking pool.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    endpoint: String,
    user_agent: String,
    request_timeout: Duration,
}

/// Sets the shared abort flag when the owning future is dropped, so an
/// in-flight transfer on the blocking pool stops at its next progress callback.
struct AbortOnDrop(Arc<AtomicBool>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl CurlTransport {
    /// Create a transport for `endpoint` (must be an absolute http/https URL).
    pub fn new(endpoint: &str) -> Result<Self> {
        let parsed = url::Url::parse(endpoint)
            .with_context(|| format!("invalid Overpass endpoint: {endpoint}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("unsupported endpoint scheme {:?}: {}", parsed.scheme(), endpoint);
        }
        Ok(Self {
            endpoint: parsed.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Client-side limit derived from the query's `[timeout:N]`; 0 keeps the default.
    pub fn with_query_timeout(mut self, timeout_secs: u64) -> Self {
        if timeout_secs > 0 {
            self.request_timeout = Duration::from_secs(timeout_secs) + TIMEOUT_GRACE;
        }
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Transport for CurlTransport {
    async fn send(&self, query: &str) -> Result<OverpassResponse, TransportFailure> {
        let abort = Arc::new(AtomicBool::new(false));
        let _guard = AbortOnDrop(Arc::clone(&abort));
        let transport = self.clone();
        let form = form_body(query);

        tokio::task::spawn_blocking(move || transport.post_blocking(&form, &abort))
            .await
            .unwrap_or_else(|e| {
                Err(TransportFailure::Other {
                    message: format!("transport task failed: {e}"),
                })
            })
    }
}

/// `data=<query>`, percent-encoded as `application/x-www-form-urlencoded`.
pub(crate) fn form_body(query: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("data", query)
        .finish()
}

fn setup_failure(e: curl::Error) -> TransportFailure {
    TransportFailure::Other {
        message: format!("curl setup: {e}"),
    }
}

impl CurlTransport {
    fn post_blocking(
        &self,
        form: &str,
        abort: &AtomicBool,
    ) -> Result<OverpassResponse, TransportFailure> {
        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint).map_err(setup_failure)?;
        easy.post(true).map_err(setup_failure)?;
        easy.post_fields_copy(form.as_bytes()).map_err(setup_failure)?;
        easy.useragent(&self.user_agent).map_err(setup_failure)?;
        easy.follow_location(true).map_err(setup_failure)?;
        // Keep POST (and the form body) across 301/302/303; libcurl switches to GET otherwise.
        let mut keep_post = curl::easy::PostRedirections::new();
        keep_post.redirect_all(true);
        easy.post_redirections(&keep_post).map_err(setup_failure)?;
        easy.connect_timeout(CONNECT_TIMEOUT).map_err(setup_failure)?;
        easy.timeout(self.request_timeout).map_err(setup_failure)?;
        easy.progress(true).map_err(setup_failure)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = str::from_utf8(data) {
                        header_lines.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(setup_failure)?;
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(setup_failure)?;
            transfer
                .progress_function(|_, _, _, _| !abort.load(Ordering::Relaxed))
                .map_err(setup_failure)?;
            if let Err(e) = transfer.perform() {
                let message = if e.is_aborted_by_callback() {
                    "request abandoned by caller".to_string()
                } else {
                    e.to_string()
                };
                return Err(TransportFailure::Connection { message });
            }
        }

        let code = easy.response_code().map_err(|e| TransportFailure::Connection {
            message: format!("no response code: {e}"),
        })?;
        let head = parse_response_head(&header_lines);
        let body = String::from_utf8_lossy(&body).into_owned();

        if (200..300).contains(&code) {
            let content_type = head.headers.get("content-type").cloned();
            return Ok(OverpassResponse { body, content_type });
        }

        Err(TransportFailure::Http {
            status: u16::try_from(code).unwrap_or(0),
            status_text: head.status_text,
            headers: head.headers,
            body,
        })
    }
}
