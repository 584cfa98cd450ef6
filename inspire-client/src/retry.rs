//! Retry policy for transient request failures
//!
//! Attempts are numbered from 1. After a transient failure of attempt `n`
//! the policy waits `base_delay * n` before attempt `n + 1`, up to
//! `max_attempts` attempts in total.

use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

use crate::error::{ClientError, Result};

/// Bounded linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay unit; the wait after attempt `n` is `base_delay * n`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to wait after the given failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Runs `operation` until it succeeds, fails permanently, or runs out
    /// of attempts
    ///
    /// Non-transient errors are returned immediately. When the last attempt
    /// fails transiently the error becomes [`ClientError::TransientFailure`].
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    if attempt >= max_attempts {
                        error!("{} failed after {} attempt(s): {}", label, attempt, e);
                        return Err(ClientError::TransientFailure {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        label, attempt, max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
