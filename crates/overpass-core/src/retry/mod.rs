//! Retry and backoff policy.
//!
//! This module encapsulates failure classification (bad query, throttling,
//! server errors, connection failures) and full-jitter exponential backoff so
//! the pipeline only ever sees a `RetryDecision`.

mod classify;
mod error;
mod policy;

pub use classify::{classify, extract_error_details};
pub use error::TransportFailure;
pub use policy::{
    backoff_ceiling, backoff_delay, backoff_delay_with, RetryContext, RetryDecision, BASE_DELAY,
};
