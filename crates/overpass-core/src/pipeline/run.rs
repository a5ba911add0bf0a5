//! Request state machine: cache check, send, classify, wait, retry.

use crate::error::OverpassError;
use crate::query::build_query;
use crate::retry::{classify, RetryContext, RetryDecision};
use crate::transport::{OverpassResponse, Transport};

use super::{ExecutionPipeline, Sleeper};

impl<T: Transport, S: Sleeper> ExecutionPipeline<T, S> {
    /// Execute `query` (body without settings preamble), serving from cache under `cache_key` when possible.
    ///
    /// At most `max_retries + 1` transport calls are made. Successful responses are
    /// cached before they are returned. Exhausting the retry budget removes any
    /// entry for `cache_key`; fatal errors leave the cache as it is.
    pub async fn run(
        &self,
        query: &str,
        cache_key: &str,
    ) -> Result<OverpassResponse, OverpassError> {
        if let Some(cached) = self.cache.get(cache_key) {
            tracing::debug!(cache_key, "cache hit");
            tokio::task::yield_now().await;
            return Ok(cached);
        }
        tracing::debug!(cache_key, "cache miss");

        let full_query = build_query(query, self.settings.format, self.settings.timeout_secs);
        let mut ctx = RetryContext::new(self.settings.max_retries);

        loop {
            let failure = match self.transport.send(&full_query).await {
                Ok(response) => {
                    self.cache.set(cache_key, response.clone());
                    return Ok(response);
                }
                Err(failure) => failure,
            };

            match classify(&failure, ctx.attempt, ctx.max_retries, &full_query) {
                RetryDecision::Fatal(err) => {
                    tracing::warn!(cache_key, attempt = ctx.attempt, error = %err, "query failed");
                    return Err(err);
                }
                RetryDecision::Exhausted(err) => {
                    self.cache.delete(cache_key);
                    tracing::warn!(
                        cache_key,
                        attempts = ctx.attempt + 1,
                        error = %err,
                        "giving up on query"
                    );
                    return Err(err);
                }
                RetryDecision::RetryAfter { delay, cause } => {
                    debug_assert!(cause.is_transient());
                    tracing::debug!(
                        cache_key,
                        attempt = ctx.attempt,
                        max_attempts = ctx.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        cause = %cause,
                        failure = %failure,
                        "retry scheduled"
                    );
                    self.sleeper.sleep(delay).await;
                    ctx.advance();
                }
            }
        }
    }
}
