//! Bounded retry with exponential backoff for store calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::StoreError;
use crate::metrics;

/// Retry policy for transient store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate delay before retry number `attempt` (zero-based).
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.base_delay.as_millis() as f64 * 2f64.powi(attempt as i32);
        let max_delay_ms = self.max_delay.as_millis() as f64;
        Duration::from_millis(delay_ms.min(max_delay_ms) as u64)
    }

    /// Run `call`, retrying while it fails with a transient error and
    /// retries remain.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.next_delay(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient store error, retrying"
                    );
                    metrics::inc_store_retries(operation);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    metrics::inc_store_errors(operation);
                    return Err(err);
                }
            }
        }
    }
}
