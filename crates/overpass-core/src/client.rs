//! Client facade: one endpoint, one owned (or injected) response cache.

use std::sync::Arc;

use anyhow::Result;

use crate::cache::CacheStore;
use crate::config::OverpassConfig;
use crate::error::OverpassError;
use crate::pipeline::{ExecutionPipeline, PipelineSettings, ResponseCache};
use crate::query::build_query;
use crate::transport::{CurlTransport, OverpassResponse, Transport};

/// Cached, retrying Overpass client.
///
/// Unless a cache is injected, each client owns a fresh store with the
/// default capacity (500) and TTL (5 minutes). Clones of the `Arc` returned
/// by [`OverpassClient::cache`] observe the same entries.
pub struct OverpassClient<T = CurlTransport> {
    pipeline: ExecutionPipeline<T>,
}

impl OverpassClient<CurlTransport> {
    /// Build a curl-backed client from configuration.
    pub fn from_config(cfg: &OverpassConfig) -> Result<Self> {
        let mut transport =
            CurlTransport::new(&cfg.endpoint)?.with_query_timeout(cfg.timeout_secs);
        if let Some(ua) = &cfg.user_agent {
            transport = transport.with_user_agent(ua.clone());
        }
        let cache_cfg = cfg.cache_config();
        let cache = Arc::new(CacheStore::new(cache_cfg.capacity, cache_cfg.ttl()));
        tracing::debug!(
            endpoint = transport.endpoint(),
            capacity = cache_cfg.capacity,
            ttl_secs = cache_cfg.ttl_secs,
            "overpass client configured"
        );
        Ok(Self::with_cache(transport, cfg.pipeline_settings(), cache))
    }
}

impl<T: Transport> OverpassClient<T> {
    /// Client with its own default-sized cache.
    pub fn new(transport: T, settings: PipelineSettings) -> Self {
        Self::with_cache(transport, settings, Arc::new(CacheStore::default()))
    }

    /// Client using an injected (possibly shared) cache.
    pub fn with_cache(transport: T, settings: PipelineSettings, cache: Arc<ResponseCache>) -> Self {
        Self {
            pipeline: ExecutionPipeline::new(transport, cache, settings),
        }
    }

    /// Run `query` (body without the settings preamble), cached under `cache_key`.
    pub async fn query(
        &self,
        query: &str,
        cache_key: &str,
    ) -> Result<OverpassResponse, OverpassError> {
        self.pipeline.run(query, cache_key).await
    }

    /// Like [`query`](Self::query), keyed by the full outgoing query text.
    pub async fn query_auto(&self, query: &str) -> Result<OverpassResponse, OverpassError> {
        let key = self.cache_key_for(query);
        self.pipeline.run(query, &key).await
    }

    /// Cache key used by [`query_auto`](Self::query_auto).
    pub fn cache_key_for(&self, query: &str) -> String {
        let settings = self.pipeline.settings();
        build_query(query, settings.format, settings.timeout_secs)
    }

    pub fn clear_cache(&self) {
        self.pipeline.cache().clear();
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        self.pipeline.cache()
    }

    pub fn settings(&self) -> &PipelineSettings {
        self.pipeline.settings()
    }
}
