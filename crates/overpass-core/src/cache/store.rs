//! In-memory LRU + TTL store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use tokio::time::{Duration, Instant};

use super::entry::CacheEntry;

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 500;
/// Default time-to-live for an entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// last_used tick -> key, oldest first.
    order: BTreeMap<u64, String>,
    tick: u64,
}

impl<V> Inner<V> {
    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }

    fn touch(&mut self, key: &str) {
        let tick = self.next_tick();
        if let Some(entry) = self.entries.get_mut(key) {
            self.order.remove(&entry.last_used);
            entry.last_used = tick;
            self.order.insert(tick, key.to_string());
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.last_used);
        Some(entry)
    }

    fn evict_lru(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Bounded, time-expiring key/value store shared by all requests of a client.
///
/// Every operation takes the internal mutex once, so `get`/`set`/`delete`
/// are individually atomic. Nothing spans multiple operations.
#[derive(Debug)]
pub struct CacheStore<V> {
    inner: Mutex<Inner<V>>,
    capacity: usize,
    ttl: Duration,
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl<V: Clone> CacheStore<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: BTreeMap::new(),
                tick: 0,
            }),
            capacity,
            ttl,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // A panic while holding the lock cannot leave the maps half-updated in a
    // way that breaks later calls, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up a live entry and mark it as most recently used.
    ///
    /// Expired entries are reported as absent and dropped.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();
        let expired = inner.entries.get(key)?.is_expired(now, self.ttl);
        if expired {
            inner.remove(key);
            return None;
        }
        inner.touch(key);
        inner.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert or overwrite `key`, resetting its insertion time.
    ///
    /// When the store is full and `key` is new, the least recently used entry is evicted first.
    pub fn set(&self, key: &str, value: V) {
        if self.capacity == 0 {
            return;
        }
        let now = Instant::now();
        let mut inner = self.lock();
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.value = value;
            entry.inserted_at = now;
            inner.touch(key);
            return;
        }
        if inner.entries.len() >= self.capacity {
            if let Some(evicted) = inner.evict_lru() {
                tracing::trace!(key = %evicted, "cache full, evicted least recently used entry");
            }
        }
        let tick = inner.next_tick();
        inner.order.insert(tick, key.to_string());
        inner
            .entries
            .insert(key.to_string(), CacheEntry::new(key.to_string(), value, now, tick));
    }

    /// Remove `key` if present.
    pub fn delete(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Number of physically stored entries (expired ones included until evicted).
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
