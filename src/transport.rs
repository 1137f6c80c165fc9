//! The network seam.
//!
//! [`Transport`] sends one prepared request and reports either the raw HTTP
//! response (any status) or a transport-level failure. Only the latter is
//! retried. [`ReqwestTransport`] is the production implementation.

use crate::config::{Environment, CONNECT_TIMEOUT};
use crate::metadata::RequestMetadata;
use crate::{Error, Result};
use async_trait::async_trait;
use http::StatusCode;

/// A failure below the HTTP layer: the request never produced a status.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

/// A response as received, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends a single request attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &RequestMetadata,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
///
/// Certificate verification follows the environment: development, local and
/// test environments accept any certificate, all others verify.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(environment: &Environment) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(!environment.verifies_tls())
            .build()
            .map_err(|e| Error::Unknown {
                message: format!("Failed to build HTTP client: {}", e),
                context: Default::default(),
            })?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &RequestMetadata,
    ) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .timeout(request.timeout);

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
