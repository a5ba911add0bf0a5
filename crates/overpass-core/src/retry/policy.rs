use std::time::Duration;

use rand::Rng;

use crate::error::OverpassError;

/// Base delay for full-jitter backoff; the ceiling doubles per attempt.
pub const BASE_DELAY: Duration = Duration::from_millis(1000);

/// Decision returned by the classifier for one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop now and surface this error.
    Fatal(OverpassError),
    /// Wait `delay`, then try again. `cause` is the transient error being retried.
    RetryAfter {
        delay: Duration,
        cause: OverpassError,
    },
    /// Retry budget used up; always `OverpassError::MaxRetriesExceeded`.
    Exhausted(OverpassError),
}

/// Per-request retry state. Lives for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// 0-based index of the current attempt.
    pub attempt: u32,
    pub max_retries: u32,
}

impl RetryContext {
    pub fn new(max_retries: u32) -> Self {
        Self {
            attempt: 0,
            max_retries,
        }
    }

    /// Upper bound on transport calls for one request.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn advance(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }
}

/// Exclusive upper bound of the backoff window for `attempt`: `2^attempt * BASE_DELAY`.
pub fn backoff_ceiling(attempt: u32) -> Duration {
    let base_ms = BASE_DELAY.as_millis() as u64;
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

/// Full-jitter delay: uniform in `[0, 2^attempt * BASE_DELAY)`.
pub fn backoff_delay(attempt: u32) -> Duration {
    backoff_delay_with(attempt, &mut rand::thread_rng())
}

pub fn backoff_delay_with<R: Rng>(attempt: u32, rng: &mut R) -> Duration {
    let ceiling_ms = backoff_ceiling(attempt).as_millis() as u64;
    Duration::from_millis(rng.gen_range(0..ceiling_ms))
}
