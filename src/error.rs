//! Error types for gateway calls.
//!
//! Every failure the client can produce is one of four kinds: bad input caught
//! before the network ([`Error::Validation`]), a transport failure that outlived
//! its retries ([`Error::Network`]), a gateway-level rejection ([`Error::Api`]),
//! or a response that could not be decoded ([`Error::Unknown`]). All of them
//! carry a structured [`Context`] map for observability.

use crate::transport::TransportError;
use http::StatusCode;
use serde_json::{Map, Value};

/// Structured key/value payload attached to errors and log events.
pub type Context = Map<String, Value>;

pub(crate) const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

/// The coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Network,
    Api,
    Unknown,
}

/// The main error type for gateway calls.
///
/// # Examples
///
/// ```no_run
/// use amwal::{AmwalClient, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = AmwalClient::builder("secret", "public").build()?;
///
/// match client.get_payment_details("0f0a7c6a-ca74-4fae").await {
///     Ok(details) => println!("Details: {:?}", details),
///     Err(Error::Api { message, status, .. }) => {
///         eprintln!("Gateway rejected the call ({:?}): {}", status, message);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input was rejected before any network call was attempted.
    #[error("{message}")]
    Validation {
        /// What was wrong with the input
        message: String,
        /// Additional details, usually empty
        context: Context,
    },

    /// The transport failed on every attempt.
    ///
    /// Only connection-level failures (DNS, connect, timeout) end up here; HTTP
    /// error statuses never do.
    #[error("HTTP request failed: {source}")]
    Network {
        /// The failure of the last attempt
        #[source]
        source: TransportError,
        /// Number of attempts made, including the first one
        attempts: usize,
        /// Always contains `url`, `error` and `environment`
        context: Context,
    },

    /// The gateway answered with an error status, or with a success status but
    /// without a field the operation requires. Local rate-limit rejections are
    /// also reported here.
    #[error("{}", describe_api(.message, .status))]
    Api {
        /// The gateway-provided message (`message`, then `error`, then "Unknown error")
        message: String,
        /// The HTTP status, when one applies
        status: Option<StatusCode>,
        /// Contains the decoded `response` when there was one, and `environment`
        context: Context,
    },

    /// The response body could not be decoded as a JSON object.
    #[error("{message}")]
    Unknown {
        /// Human readable summary
        message: String,
        /// Contains `json_error` and `environment`
        context: Context,
    },
}

fn describe_api(message: &str, status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!("API Error ({}): {}", status.as_u16(), message),
        None => message.to_string(),
    }
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            context: Context::new(),
        }
    }

    pub(crate) fn rate_limited(endpoint: &str, environment: &str) -> Self {
        let mut context = Context::new();
        context.insert("endpoint".into(), Value::from(endpoint));
        context.insert("environment".into(), Value::from(environment));
        Error::Api {
            message: RATE_LIMIT_MESSAGE.to_string(),
            status: None,
            context,
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Network { .. } => ErrorKind::Network,
            Error::Api { .. } => ErrorKind::Api,
            Error::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns the message without the formatting `Display` adds.
    pub fn message(&self) -> String {
        match self {
            Error::Validation { message, .. }
            | Error::Api { message, .. }
            | Error::Unknown { message, .. } => message.clone(),
            Error::Network { source, .. } => source.to_string(),
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns the numeric code: the HTTP status when there is one, 0 otherwise.
    pub fn code(&self) -> u16 {
        self.status().map(|s| s.as_u16()).unwrap_or(0)
    }

    /// Returns the structured context attached to this error.
    pub fn context(&self) -> &Context {
        match self {
            Error::Validation { context, .. }
            | Error::Network { context, .. }
            | Error::Api { context, .. }
            | Error::Unknown { context, .. } => context,
        }
    }

    /// Returns `true` if the call was refused by the local rate limiter.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: None, message, .. } if message == RATE_LIMIT_MESSAGE)
    }
}

/// A specialized `Result` type for gateway calls.
pub type Result<T> = std::result::Result<T, Error>;
