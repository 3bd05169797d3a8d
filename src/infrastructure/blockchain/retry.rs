//! Retry with capped exponential backoff for RPC calls

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;
use crate::shared::errors::BlockchainError;

/// Retry policy applied at the RPC boundary.
///
/// Only rate-limit responses are retried; every other error is returned on
/// the first failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 4_000,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after the failed attempt number `attempt` (0-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let millis = self.initial_backoff_ms.saturating_mul(factor).min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are used up.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, BlockchainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BlockchainError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limited() && attempt + 1 < attempts => {
                    let backoff = self.backoff_for(attempt);
                    warn!("{}: rate limited, retrying in {}ms ({}/{})", label, backoff.as_millis(), attempt + 1, attempts);
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(1_000));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(2_000));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(4_000));
        assert_eq!(policy.backoff_for(10), Duration::from_millis(4_000));
        assert_eq!(policy.backoff_for(200), Duration::from_millis(4_000));
    }

    #[tokio::test]
    async fn test_retries_rate_limits_until_success() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(5)
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(BlockchainError::RateLimited("429".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(BlockchainError::RateLimited("429".to_string())) }
            })
            .await;

        assert!(result.unwrap_err().is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(5)
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(BlockchainError::Rpc("account not found".to_string())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
