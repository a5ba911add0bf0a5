//! Query execution pipeline.
//!
//! Each call to [`ExecutionPipeline::run`] is an independent state machine:
//! cache check, then send / classify / wait until the request succeeds, fails
//! fatally or runs out of retries. Requests share only the cache; identical
//! concurrent requests are not coalesced.

mod run;
mod sleep;

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::query::OutputFormat;
use crate::transport::OverpassResponse;

pub use sleep::{Sleeper, TokioSleeper};

/// Shared response cache type used by the pipeline and client.
pub type ResponseCache = CacheStore<OverpassResponse>;

/// Per-pipeline settings (fixed at construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub format: OutputFormat,
    /// Server-side `[timeout:N]`; 0 omits the clause.
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            timeout_secs: 25,
            max_retries: 3,
        }
    }
}

pub struct ExecutionPipeline<T, S = TokioSleeper> {
    transport: T,
    cache: Arc<ResponseCache>,
    settings: PipelineSettings,
    sleeper: S,
}

impl<T> ExecutionPipeline<T, TokioSleeper> {
    pub fn new(transport: T, cache: Arc<ResponseCache>, settings: PipelineSettings) -> Self {
        Self::with_sleeper(transport, cache, settings, TokioSleeper)
    }
}

impl<T, S> ExecutionPipeline<T, S> {
    pub fn with_sleeper(
        transport: T,
        cache: Arc<ResponseCache>,
        settings: PipelineSettings,
        sleeper: S,
    ) -> Self {
        Self {
            transport,
            cache,
            settings,
            sleeper,
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
pub(crate) mod testing;
