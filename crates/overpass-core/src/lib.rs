//! Cached, retrying query execution for the Overpass geospatial API.
//!
//! [`client::OverpassClient`] wraps an [`pipeline::ExecutionPipeline`] that
//! serves repeated queries from an in-memory LRU/TTL cache, retries rate
//! limits and server errors with full-jitter backoff, and reports terminal
//! failures as a single [`error::OverpassError`].

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod retry;
pub mod transport;

pub use client::OverpassClient;
pub use error::OverpassError;
pub use transport::OverpassResponse;
