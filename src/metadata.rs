//! Request construction: endpoint URLs, headers and JSON bodies.

use crate::config::{Credentials, DEFAULT_TIMEOUT};
use crate::{Error, Result};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the merchant's public key.
pub const X_AMWAL_KEY: HeaderName = HeaderName::from_static("x-amwal-key");

/// Everything needed to send one request.
///
/// Built once per operation and reused unchanged for every retry attempt.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET or POST for gateway calls).
    pub method: Method,

    /// The absolute request URL.
    pub url: String,

    pub headers: HeaderMap,

    /// The JSON-encoded body, if any.
    pub body: Option<String>,

    /// Overall timeout of one attempt.
    pub timeout: Duration,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches `payload` as a JSON body.
    ///
    /// GET requests never carry a body, and payloads that encode to `null`,
    /// `{}` or `[]` are not attached.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the payload cannot be encoded.
    pub fn with_json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        if self.method == Method::GET {
            return Ok(self);
        }

        let value = serde_json::to_value(payload)
            .map_err(|e| Error::validation(format!("Failed to encode request payload: {}", e)))?;
        let is_empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if !is_empty {
            self.body = Some(value.to_string());
        }
        Ok(self)
    }
}

/// `Accept` and `Content-Type` set to JSON, plus `Origin` when given.
///
/// # Errors
///
/// Returns a validation error if the origin is not a valid header value.
pub fn default_headers(origin: Option<&str>) -> Result<HeaderMap> {
    let json = HeaderValue::from_static("application/json");
    let mut headers = HeaderMap::with_capacity(5);
    headers.insert(ACCEPT, json.clone());
    headers.insert(CONTENT_TYPE, json);

    if let Some(origin) = origin.filter(|o| !o.is_empty()) {
        let value = HeaderValue::try_from(origin)
            .map_err(|e| Error::validation(format!("Invalid origin header value: {}", e)))?;
        headers.insert(ORIGIN, value);
    }

    Ok(headers)
}

/// Builds authenticated header sets from a key pair.
///
/// The secret key goes into `Authorization` verbatim, without a `Bearer`
/// prefix; the gateway expects exactly that.
#[derive(Debug, Clone)]
pub(crate) struct AuthHeaders {
    public_key: HeaderValue,
    authorization: HeaderValue,
}

impl AuthHeaders {
    pub(crate) fn new(credentials: &Credentials) -> Result<Self> {
        let public_key = HeaderValue::try_from(credentials.public_key())
            .map_err(|_| Error::validation("Public key is not a valid header value"))?;
        let mut authorization = HeaderValue::try_from(credentials.secret_key())
            .map_err(|_| Error::validation("Secret key is not a valid header value"))?;
        authorization.set_sensitive(true);

        Ok(Self {
            public_key,
            authorization,
        })
    }

    /// [`default_headers`] plus `X-Amwal-Key` and `Authorization`.
    pub(crate) fn headers(&self, origin: Option<&str>) -> Result<HeaderMap> {
        let mut headers = default_headers(origin)?;
        headers.insert(X_AMWAL_KEY, self.public_key.clone());
        headers.insert(AUTHORIZATION, self.authorization.clone());
        Ok(headers)
    }
}

pub(crate) fn validate_merchant_url(base: &str) -> String {
    format!("{}/api/validate-merchant-api-key/", base)
}

pub(crate) fn create_payment_url(base: &str, store_id: &str) -> String {
    format!("{}/payment_links/{}/create", base, store_id)
}

pub(crate) fn payment_link_details_url(base: &str, id: &str) -> String {
    format!("{}/payment_links/{}/details", base, id)
}

pub(crate) fn transaction_url(base: &str, id: &str) -> String {
    format!("{}/transactions/{}", base, id)
}

pub(crate) fn refund_url(base: &str, id: &str) -> String {
    format!("{}/transactions/refund/{}/", base, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_headers() {
        let headers = default_headers(None).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[CONTENT_TYPE], "application/json");

        let headers = default_headers(Some("https://shop.example")).unwrap();
        assert_eq!(headers[ORIGIN], "https://shop.example");

        let headers = default_headers(Some("")).unwrap();
        assert!(headers.get(ORIGIN).is_none());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let err = default_headers(Some("bad\norigin")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_auth_headers_send_secret_verbatim() {
        let auth = AuthHeaders::new(&Credentials::new("sk-123", "pk-456")).unwrap();
        let headers = auth.headers(Some("https://shop.example")).unwrap();

        assert_eq!(headers[AUTHORIZATION], "sk-123");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers["x-amwal-key"], "pk-456");
        assert_eq!(headers[ORIGIN], "https://shop.example");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn test_get_never_carries_body() {
        let request = RequestMetadata::new(Method::GET, "https://gw/x")
            .with_json(&json!({"amount": 1}))
            .unwrap();
        assert!(request.body.is_none());
    }

    #[test]
    fn test_empty_payload_is_not_attached() {
        let request = RequestMetadata::new(Method::POST, "https://gw/x")
            .with_json(&json!({}))
            .unwrap();
        assert!(request.body.is_none());

        let request = RequestMetadata::new(Method::POST, "https://gw/x")
            .with_json(&json!({"amount": 1}))
            .unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"amount":1}"#));
    }

    #[test]
    fn test_endpoint_urls() {
        let base = "https://gw.example";
        assert_eq!(
            validate_merchant_url(base),
            "https://gw.example/api/validate-merchant-api-key/"
        );
        assert_eq!(
            create_payment_url(base, "store-1"),
            "https://gw.example/payment_links/store-1/create"
        );
        assert_eq!(
            payment_link_details_url(base, "link_12345"),
            "https://gw.example/payment_links/link_12345/details"
        );
        assert_eq!(
            transaction_url(base, "tx_1234567"),
            "https://gw.example/transactions/tx_1234567"
        );
        assert_eq!(
            refund_url(base, "tx_1234567"),
            "https://gw.example/transactions/refund/tx_1234567/"
        );
    }
}
