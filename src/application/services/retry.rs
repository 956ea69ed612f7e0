//! # Retry Policy
//!
//! Bounded retry with a fixed pause between attempts.
//!
//! The asynchronous publisher is the only caller: a failed publish is retried
//! a few times, then given up on and logged.
//!
//! # Example
//!
//! ```
//! use price_service::application::services::retry::{RetryPolicy, execute_with_retry};
//! use price_service::infrastructure::messaging::PublishError;
//!
//! # async fn example() {
//! let policy = RetryPolicy::fixed(5, 50);
//! let result = execute_with_retry(&policy, || async {
//!     Err::<(), _>(PublishError::connection("broker down"))
//! })
//! .await;
//! assert_eq!(result.unwrap_err().attempts(), 6);
//! # }
//! ```

use crate::infrastructure::messaging::PublishError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    /// Returns true if the operation should be attempted again.
    fn is_retryable(&self) -> bool;
}

impl Retryable for PublishError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidHeader { .. })
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub max_retries: u32,
    /// Pause before each retry, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(5, 50)
    }
}

impl RetryPolicy {
    /// Creates a fixed-backoff policy.
    #[must_use]
    pub const fn fixed(max_retries: u32, delay_ms: u64) -> Self {
        Self {
            max_retries,
            delay_ms,
        }
    }

    /// Pause before the next retry.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Returns true if another retry is allowed after `attempts_made` attempts.
    #[inline]
    #[must_use]
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made <= self.max_retries
    }
}

/// Error returned when retrying gives up.
#[derive(Debug, Error)]
pub enum RetryError<E: std::fmt::Display> {
    /// Every allowed attempt failed.
    #[error("gave up after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The last error encountered.
        last_error: E,
        /// Total number of attempts made.
        attempts: u32,
    },
    /// The error was not worth retrying.
    #[error("non-retryable error after {attempts} attempts: {error}")]
    NonRetryable {
        /// The error.
        error: E,
        /// Attempts made.
        attempts: u32,
    },
}

impl<E: std::fmt::Display> RetryError<E> {
    /// Returns the number of attempts made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::MaxRetriesExceeded { attempts, .. } | Self::NonRetryable { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently or runs out of
/// attempts.
///
/// # Errors
///
/// Returns `RetryError::MaxRetriesExceeded` once `1 + max_retries` attempts
/// have failed, or `RetryError::NonRetryable` on the first error that is not
/// retryable.
pub async fn execute_with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);

        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if !error.is_retryable() => {
                return Err(RetryError::NonRetryable { error, attempts });
            }
            Err(error) => {
                if !policy.should_retry(attempts) {
                    return Err(RetryError::MaxRetriesExceeded {
                        last_error: error,
                        attempts,
                    });
                }
                sleep(policy.delay()).await;
            }
        }
    }
}
