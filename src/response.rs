//! Decoding gateway responses.
//!
//! [`handle_response`] turns a raw exchange into either an [`HttpOutcome`] or
//! the matching [`Error`]. The body is decoded before the status is inspected,
//! so a malformed body is reported as a decode failure even on error statuses.

use crate::config::Environment;
use crate::error::Context;
use crate::executor::Exchange;
use crate::log::context;
use crate::{Error, Result};
use http::StatusCode;
use serde_json::{Map, Value};
use std::time::Duration;

/// A decoded, successful gateway response.
///
/// # Examples
///
/// ```
/// # use amwal::HttpOutcome;
/// # use http::StatusCode;
/// # use std::time::Duration;
/// let outcome = HttpOutcome::new(
///     serde_json::json!({"url": "https://pay.example/x"}).as_object().unwrap().clone(),
///     r#"{"url":"https://pay.example/x"}"#.to_string(),
///     StatusCode::OK,
///     Duration::from_millis(120),
///     1,
/// );
///
/// assert_eq!(outcome.str_field("url"), Some("https://pay.example/x"));
/// assert!(!outcome.was_retried());
/// ```
#[derive(Debug, Clone)]
pub struct HttpOutcome {
    /// The decoded JSON object.
    pub body: Map<String, Value>,

    /// The raw response body as received.
    pub raw_body: String,

    pub status: StatusCode,

    /// Time from the first attempt until the response arrived, including backoff.
    pub latency: Duration,

    /// Attempts made; `1` when the first attempt succeeded.
    pub attempts: usize,
}

impl HttpOutcome {
    pub fn new(
        body: Map<String, Value>,
        raw_body: String,
        status: StatusCode,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            body,
            raw_body,
            status,
            latency,
            attempts,
        }
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Returns a field if it is a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.body.get(name)?.as_str()
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

/// Decodes the exchange and maps error statuses to [`Error::Api`].
pub(crate) fn handle_response(
    exchange: Exchange,
    environment: &Environment,
) -> Result<HttpOutcome> {
    let Exchange {
        response,
        latency,
        attempts,
    } = exchange;

    let body = match decode_object(&response.body) {
        Ok(body) => body,
        Err(json_error) => {
            tracing::error!(
                error = %json_error,
                status = response.status.as_u16(),
                raw_response = %response.body,
                "Failed to decode response"
            );
            return Err(Error::Unknown {
                message: format!("Invalid JSON response: {}", json_error),
                context: context! {
                    "json_error" => json_error,
                    "status" => response.status.as_u16(),
                    "environment" => environment.as_str(),
                },
            });
        }
    };

    if response.status.as_u16() >= 400 {
        let message = error_message(&body);
        tracing::error!(
            status = response.status.as_u16(),
            message = %message,
            "Gateway returned an error status"
        );

        let mut context = Context::new();
        context.insert("response".to_string(), Value::Object(body));
        context.insert("environment".to_string(), Value::from(environment.as_str()));
        return Err(Error::Api {
            message,
            status: Some(response.status),
            context,
        });
    }

    Ok(HttpOutcome::new(
        body,
        response.body,
        response.status,
        latency,
        attempts,
    ))
}

fn decode_object(raw: &str) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// `message`, then `error`, then "Unknown error".
fn error_message(body: &Map<String, Value>) -> String {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find(|value| !value.is_null())
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}
