//! Backoff schedule for transport failures.
//!
//! Only transport-level failures are retried. HTTP error statuses and local
//! rate-limit rejections go straight back to the caller.

use async_trait::async_trait;
use std::time::Duration;

/// Delay before the first retry.
pub const INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Exponential backoff: `initial_delay * 2^(retry - 1)`.
///
/// # Examples
///
/// ```
/// use amwal::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential(3);
/// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(100)));
/// assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(400)));
/// assert_eq!(policy.delay_for_attempt(4), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The delay before the first retry.
    pub initial_delay: Duration,
    /// The maximum number of retries after the first attempt.
    pub max_retries: usize,
}

impl RetryPolicy {
    /// Backoff starting at [`INITIAL_DELAY`].
    pub fn exponential(max_retries: usize) -> Self {
        Self {
            initial_delay: INITIAL_DELAY,
            max_retries,
        }
    }

    /// Returns the delay before the given retry, or `None` if retries are exhausted.
    ///
    /// # Arguments
    ///
    /// * `retry` - The retry number (1-indexed, so 1 = first retry)
    pub fn delay_for_attempt(&self, retry: usize) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries {
            return None;
        }

        let multiplier = 2u32.saturating_pow(retry.saturating_sub(1) as u32);
        Some(self.initial_delay.saturating_mul(multiplier))
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }
}

/// Waits between attempts.
///
/// Injected so that tests can record the schedule without waiting for it.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
