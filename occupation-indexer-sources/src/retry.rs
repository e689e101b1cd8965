//! Explicit retry helper with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::SourceError;

/// How often and how patiently to retry a failed upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds.
    pub initial_delay_ms: u64,
    /// Ceiling for the doubling delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2000,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// the policy's attempts are exhausted.
///
/// # Arguments
///
/// * `policy` - Attempt count and backoff bounds
/// * `label` - Name of the operation, used in logs
/// * `operation` - Produces a fresh future for every attempt
///
/// # Returns
///
/// * `Ok(T)` - The first successful result
/// * `Err(SourceError)` - The last error seen
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(label = %label, attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                debug!(label = %label, error = %e, "Non-retryable error encountered");
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                warn!(label = %label, attempts = attempt, error = %e, "Retries exhausted");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    label = %label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_delay_doubles_up_to_ceiling() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(8000));
        assert_eq!(policy.delay_after(4), Duration::from_millis(10_000));
        assert_eq!(policy.delay_after(40), Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let result = retry_with_backoff(&RetryPolicy::default(), "flaky", || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(SourceError::transport("connection reset"))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let policy = RetryPolicy::default();

        let result: Result<(), _> = retry_with_backoff(&policy, "down", || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Http {
                status: 503,
                url: "http://upstream".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(SourceError::Http { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_retry_permanent_errors() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let policy = RetryPolicy::default();

        let result: Result<(), _> = retry_with_backoff(&policy, "missing", || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Http {
                status: 404,
                url: "http://upstream".to_string(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
