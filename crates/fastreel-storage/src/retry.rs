//! Bounded retry with exponential backoff for storage writes.

use crate::{StorageError, StorageResult};
use fastreel_core::Config;
use std::future::Future;
use std::time::Duration;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Applied to every attempt individually.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            attempt_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.storage.max_retries,
            Duration::from_millis(config.storage.retry_base_delay_ms),
            config.storage_timeout(),
        )
    }

    /// Delay before retry number `retry` (0-based): `base_delay * 2^retry`, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.min(16));
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Run `operation` until it succeeds, fails terminally, or retries are exhausted.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> StorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        let mut retry = 0;
        loop {
            let result = match tokio::time::timeout(self.attempt_timeout, attempt()).await {
                Ok(result) => result,
                Err(_) => Err(StorageError::Timeout(self.attempt_timeout)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retry < self.max_retries => {
                    let delay = self.backoff(retry);
                    tracing::warn!(
                        error = %e,
                        operation = operation,
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Storage operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
