//! Client-side rate limiting.
//!
//! The gateway allows one call per endpoint and merchant key per window. The
//! [`RateLimiter`] remembers when each (endpoint, secret key) pair was last
//! called and refuses a new call until the window has passed. One limiter is
//! shared by every client in the process unless a client is given its own.

use crate::config::Environment;
use crate::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a key stays blocked after a call.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

static SHARED: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::default()));

/// Single-slot limiter keyed by endpoint and credential.
///
/// This is not a sliding window or a token bucket: a key is refused while less
/// than `window` has elapsed since its last accepted call, and accepted
/// otherwise. Entries are never evicted.
///
/// # Examples
///
/// ```
/// use amwal::{Environment, RateLimiter};
///
/// let limiter = RateLimiter::default();
/// let env = Environment::Production;
///
/// assert!(limiter.check("https://gw/transactions/1", "secret", &env).is_ok());
/// assert!(limiter.check("https://gw/transactions/1", "secret", &env).is_err());
///
/// // Development, local and test environments are never limited.
/// assert!(limiter.check("https://gw/transactions/1", "secret", &Environment::Test).is_ok());
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    last_calls: DashMap<String, Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    /// Creates a limiter with a custom window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            last_calls: DashMap::new(),
        }
    }

    /// The process-wide limiter used by clients that were not given one.
    pub fn shared() -> Arc<RateLimiter> {
        Arc::clone(&SHARED)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of keys seen so far.
    pub fn len(&self) -> usize {
        self.last_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_calls.is_empty()
    }

    /// Records a call to `endpoint` with `credential`, or refuses it.
    ///
    /// # Errors
    ///
    /// Returns a rate-limit [`Error::Api`] if the same key was accepted less
    /// than one window ago in a live environment.
    pub fn check(&self, endpoint: &str, credential: &str, environment: &Environment) -> Result<()> {
        if !environment.enforces_rate_limit() {
            return Ok(());
        }

        let key = composite_key(endpoint, credential);
        if self.try_acquire(key, Instant::now()) {
            Ok(())
        } else {
            tracing::warn!(
                endpoint = %endpoint,
                environment = %environment,
                window_secs = self.window.as_secs(),
                "Rate limit exceeded"
            );
            Err(Error::rate_limited(endpoint, environment.as_str()))
        }
    }

    /// Holds the shard lock for `key` across the read and the write.
    fn try_acquire(&self, key: String, now: Instant) -> bool {
        match self.last_calls.entry(key) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.window {
                    return false;
                }
                entry.insert(now);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }
}

/// Hex SHA-256 of the endpoint followed by the credential.
pub(crate) fn composite_key(endpoint: &str, credential: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(credential.as_bytes());
    hex::encode(hasher.finalize())
}
