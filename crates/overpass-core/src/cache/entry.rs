use tokio::time::{Duration, Instant};

/// A single cached value plus the bookkeeping the store needs for expiry and LRU order.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    /// Reset on every `set` for this key.
    pub inserted_at: Instant,
    /// Monotonic use counter; higher = more recently used.
    pub(super) last_used: u64,
}

impl<V> CacheEntry<V> {
    pub(super) fn new(key: String, value: V, now: Instant, tick: u64) -> Self {
        Self {
            key,
            value,
            inserted_at: now,
            last_used: tick,
        }
    }

    /// An entry is expired once its age strictly exceeds the TTL.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) > ttl
    }
}
