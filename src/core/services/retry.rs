//! Bounded retry with exponential backoff for external calls

use std::fmt::Display;
use std::time::Duration;

/// Upper bound for a single backoff sleep
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// How often and how patiently to retry a failing call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries including the first one (values below 1 behave as 1)
    pub max_attempts: u32,
    /// Sleep before the first retry; doubled for each further retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Single try, no retries
    #[must_use]
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Sleep before retry number `retry` (1-based), capped at [`MAX_BACKOFF`]
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Run `op` until it succeeds or the attempts are used up
    ///
    /// Returns the last error when every try failed.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    log::warn!(
                        "{operation} failed (attempt {attempt}/{attempts}): {e}; retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }
}
