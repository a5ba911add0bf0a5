//! Response cache.
//!
//! A bounded, process-local map from cache key to response with:
//! - a time-to-live after which entries are treated as absent
//! - least-recently-used eviction when the capacity is reached
//!
//! One store is owned by each client and shared (via `Arc`) by all of its
//! in-flight requests.

mod entry;
mod store;

pub use entry::CacheEntry;
pub use store::{CacheStore, DEFAULT_CAPACITY, DEFAULT_TTL};
