//! How often a failed Yahoo call is repeated, and how long to wait between tries.

use std::time::Duration;

use crate::http_client::{HttpError, HttpResponse};

/// Wait before retry `n` (0-based): `initial * 2^n`, never above `ceiling`.
/// With `jitter` the wait lands anywhere in 50%..150% of that value so that
/// parallel ticker jobs do not hammer the upstream in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub ceiling: Duration,
    pub jitter: bool,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            ceiling: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Same wait every time, no jitter.
    pub const fn constant(wait: Duration) -> Self {
        Self {
            initial: wait,
            ceiling: wait,
            jitter: false,
        }
    }

    pub fn delay(self, retry: u32) -> Duration {
        let doubled = self
            .initial
            .checked_mul(1_u32.checked_shl(retry).unwrap_or(u32::MAX))
            .unwrap_or(self.ceiling);
        let wait = doubled.min(self.ceiling);
        if !self.jitter {
            return wait;
        }

        let millis = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        let half = millis / 2;
        Duration::from_millis(half + fastrand::u64(0..=millis))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Extra attempts after the first one; zero disables retrying.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn fixed(wait: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::constant(wait),
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Timeouts, throttling and gateway trouble. Any other status is final.
    pub const fn is_retryable_status(status: u16) -> bool {
        matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
    }

    /// Decides after attempt `attempt` (0-based) has produced `outcome`.
    pub fn should_retry(&self, attempt: u32, outcome: &Result<HttpResponse, HttpError>) -> bool {
        attempt < self.max_retries
            && match outcome {
                Ok(response) => Self::is_retryable_status(response.status),
                Err(error) => error.retryable(),
            }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
