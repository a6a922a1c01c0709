//! Retry with exponential backoff for transient failures
//!
//! This module provides the retrying call wrapper used by every backend
//! operation. Transient failures (no response, 502/503/504) are retried
//! after a growing delay; everything else is normalized immediately.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};

use crate::error::{mapping, Result};

use super::ApiResponse;

/// Default number of retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 1;

/// Default delay before the first retry
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Default growth factor between successive delays
pub const DEFAULT_MULTIPLIER: f64 = 3.0;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt (0 means a single attempt)
    pub retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after every retry
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryPolicy {{ retries: {}, initial_delay: {:?}, multiplier: {} }}",
            self.retries, self.initial_delay, self.multiplier
        )
    }
}

impl RetryPolicy {
    /// Policy with the given retry budget and default delays
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }

    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self::with_retries(0)
    }

    /// Set the initial delay
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Build the deterministic backoff sequence for this policy
    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            multiplier: self.multiplier,
            randomization_factor: 0.0,
            max_interval: Duration::from_secs(u32::MAX as u64),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        };
        backoff.reset();
        backoff
    }

    /// The sleeps taken between attempts when every attempt is transient
    pub fn delay_schedule(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (0..self.retries)
            .filter_map(|_| backoff.next_backoff())
            .map(truncate_to_millis)
            .collect()
    }
}

/// Executor for retry operations with exponential backoff
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    /// Retry configuration
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the specified policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget runs out, and return the raw result
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.policy.backoff();
        let mut remaining = self.policy.retries;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && remaining > 0 => {
                    let delay = match backoff.next_backoff() {
                        Some(delay) => truncate_to_millis(delay),
                        None => return Err(err.with_context_value("attempts", attempts)),
                    };

                    log::warn!(
                        "Transient failure, retrying in {:?} (attempt {}/{}): {}",
                        delay,
                        attempts,
                        self.policy.retries + 1,
                        err
                    );

                    tokio::time::sleep(delay).await;
                    remaining -= 1;
                }
                Err(err) => {
                    if attempts > 1 {
                        return Err(err.with_context_value("attempts", attempts));
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Run `operation` with retries and normalize the outcome into an
    /// [`ApiResponse`]. Never fails.
    pub async fn call<F, Fut, T>(&self, operation: F) -> ApiResponse<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.execute(operation).await {
            Ok(data) => ApiResponse::success(data),
            Err(err) => {
                let message = mapping::normalize_error(&err);
                log::debug!("Call failed ({:?}): {}", mapping::classify(&err), message);
                ApiResponse::failure(message)
            }
        }
    }

    /// Get the current retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Update the retry policy
    pub fn update_policy(&mut self, policy: RetryPolicy) {
        self.policy = policy;
    }
}

/// Execute `operation` with the default policy (1 retry, 500ms, ×3)
pub async fn call<F, Fut, T>(operation: F) -> ApiResponse<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    RetryExecutor::default().call(operation).await
}

/// Execute `operation` with an explicit retry budget and initial delay
pub async fn call_with<F, Fut, T>(
    operation: F,
    retries: u32,
    initial_delay: Duration,
) -> ApiResponse<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    RetryExecutor::new(RetryPolicy::with_retries(retries).initial_delay(initial_delay))
        .call(operation)
        .await
}

// The backoff crate adds up to a nanosecond of jitter even with a zero
// randomization factor.
fn truncate_to_millis(delay: Duration) -> Duration {
    Duration::from_millis(delay.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_default_delay_schedule() {
        assert_eq!(
            RetryPolicy::default().delay_schedule(),
            vec![Duration::from_millis(500)]
        );
        assert_eq!(
            RetryPolicy::with_retries(3).delay_schedule(),
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1500),
                Duration::from_millis(4500)
            ]
        );
        assert!(RetryPolicy::no_retry().delay_schedule().is_empty());
    }

    #[tokio::test]
    async fn test_successful_operation() {
        let retry = RetryExecutor::default();
        let result = retry.execute(|| async { Ok::<_, ServiceError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_failure() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let retry = RetryExecutor::new(RetryPolicy::with_retries(2));

        let result = retry
            .execute(|| {
                let attempt_count = Arc::clone(&attempt_count);
                async move {
                    if attempt_count.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ServiceError::network("Test failure"))
                    } else {
                        Ok::<_, ServiceError>(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_validation_error() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let retry = RetryExecutor::new(RetryPolicy::with_retries(3));

        let result: Result<()> = retry
            .execute(|| {
                let attempt_count = Arc::clone(&attempt_count);
                async move {
                    attempt_count.fetch_add(1, Ordering::SeqCst);
                    Err(ServiceError::http(422, None))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }
}
