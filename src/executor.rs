//! Sending requests with bounded retries.
//!
//! A call moves through `Building -> Sending -> (Success | Retrying -> Sending
//! | Failed)`. The rate limiter is consulted once, before the first attempt.
//! Any HTTP status counts as a successful exchange; only transport failures
//! lead to `Retrying`, and exhausting the retries fails the call.

use crate::config::Environment;
use crate::log::{context, EventLog};
use crate::metadata::RequestMetadata;
use crate::rate_limit::RateLimiter;
use crate::retry::{RetryPolicy, Sleeper};
use crate::transport::{RawResponse, Transport};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A raw response together with how long it took to obtain.
#[derive(Debug, Clone)]
pub(crate) struct Exchange {
    pub(crate) response: RawResponse,
    pub(crate) latency: Duration,
    pub(crate) attempts: usize,
}

pub(crate) struct HttpExecutor {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    rate_limiter: Arc<RateLimiter>,
    environment: Environment,
    credential: String,
    log: EventLog,
}

impl HttpExecutor {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
        rate_limiter: Arc<RateLimiter>,
        environment: Environment,
        credential: String,
        log: EventLog,
    ) -> Self {
        Self {
            transport,
            sleeper,
            rate_limiter,
            environment,
            credential,
            log,
        }
    }

    /// Sends `request`, retrying transport failures according to `policy`.
    ///
    /// # Errors
    ///
    /// Returns the rate limiter's error without sending anything, or
    /// [`Error::Network`] once every allowed attempt has failed.
    pub(crate) async fn execute(
        &self,
        request: &RequestMetadata,
        policy: RetryPolicy,
    ) -> Result<Exchange> {
        self.rate_limiter
            .check(&request.url, &self.credential, &self.environment)?;

        if let Some(body) = &request.body {
            self.log
                .debug("Request payload", context! { "payload_size" => body.len() });
        }

        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let attempt_start = Instant::now();
            let result = self.transport.send(request).await;
            let duration = attempt_start.elapsed();

            let status = result.as_ref().map(|r| r.status.as_u16()).unwrap_or(0);
            self.log.debug(
                "HTTP Request",
                context! {
                    "url" => request.url.as_str(),
                    "method" => request.method.as_str(),
                    "status" => status,
                    "duration" => round_millis(duration),
                    "attempt" => attempt,
                },
            );

            let error = match result {
                Ok(response) => {
                    return Ok(Exchange {
                        response,
                        latency: start_time.elapsed(),
                        attempts: attempt,
                    });
                }
                Err(error) => error,
            };

            let retry_count = attempt - 1;
            self.log.error(
                "HTTP request failed",
                context! {
                    "error" => error.to_string(),
                    "retry_count" => retry_count,
                },
            );

            match policy.delay_for_attempt(attempt) {
                Some(delay) => {
                    self.log.warn(
                        "Retrying request after delay",
                        context! {
                            "delay_ms" => delay.as_millis() as u64,
                            "attempt" => attempt,
                        },
                    );
                    self.sleeper.sleep(delay).await;
                }
                None => {
                    return Err(Error::Network {
                        attempts: attempt,
                        context: context! {
                            "url" => request.url.as_str(),
                            "error" => error.to_string(),
                            "environment" => self.environment.as_str(),
                        },
                        source: error,
                    });
                }
            }
        }
    }
}

/// Seconds with millisecond precision.
fn round_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}
