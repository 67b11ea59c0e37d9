//! Bounded retry with exponential backoff for backend calls

use graphsmith_domain::BackendError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Retry policy for backend calls
///
/// Only retryable errors (timeouts, unavailability) are retried; everything
/// else is returned on the first failure.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` extra attempts
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `f` until it succeeds, fails permanently, or retries run out
    ///
    /// Returns the final result together with the number of attempts made.
    pub async fn retry<F, Fut, T>(
        &self,
        operation: &str,
        mut f: F,
    ) -> (Result<T, BackendError>, usize)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation, attempts = attempt, "Operation succeeded after retries");
                    }
                    return (Ok(value), attempt as usize);
                }
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Operation failed, retrying"
                    );
                    sleep(backoff).await;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!(
                            operation,
                            attempts = attempt,
                            error = %e,
                            "Operation failed after max retries"
                        );
                    }
                    return (Err(e), attempt as usize);
                }
            }
        }
    }
}
