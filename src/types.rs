//! Request payloads and normalized results of the gateway operations.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::str::FromStr;

/// Optional sign, digits with an optional fraction, optional exponent.
/// Surrounding whitespace is allowed.
static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?\s*$")
        .expect("Invalid regex for numeric amount")
});

/// A payment amount as supplied by the caller.
///
/// Amounts are sent to the gateway exactly as given; numeric strings stay
/// strings. Use [`Amount::to_f64`] or [`Amount::to_decimal`] to read the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Number),
    Text(String),
}

impl Amount {
    /// `true` for JSON numbers and for strings in plain or scientific
    /// decimal notation, such as `"12"`, `" 0.5 "`, `".5"` or `"1e40"`.
    ///
    /// ```
    /// use amwal::Amount;
    ///
    /// assert!(Amount::from("1e40").is_numeric());
    /// assert!(!Amount::from("1_000").is_numeric());
    /// assert!(!Amount::from("0x1A").is_numeric());
    /// ```
    pub fn is_numeric(&self) -> bool {
        match self {
            Amount::Number(_) => true,
            Amount::Text(s) => NUMERIC_REGEX.is_match(s),
        }
    }

    /// The amount as a float; `None` if it is not numeric.
    ///
    /// Values beyond the `f64` range become infinite rather than failing.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => n.as_f64(),
            Amount::Text(s) if NUMERIC_REGEX.is_match(s) => s.trim().parse().ok(),
            Amount::Text(_) => None,
        }
    }

    /// `true` if the amount is numeric and greater than zero.
    pub fn is_positive(&self) -> bool {
        self.to_f64().is_some_and(|value| value > 0.0)
    }

    /// Parses the amount as an exact decimal.
    ///
    /// Returns `None` if the amount is not numeric or does not fit in a
    /// [`Decimal`] (28 significant digits).
    pub fn to_decimal(&self) -> Option<Decimal> {
        if !self.is_numeric() {
            return None;
        }
        let text = match self {
            Amount::Number(n) => n.to_string(),
            Amount::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }

    /// `true` if nothing but whitespace was supplied.
    pub fn is_blank(&self) -> bool {
        matches!(self, Amount::Text(s) if s.trim().is_empty())
    }
}

macro_rules! amount_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Amount {
            fn from(value: $t) -> Self {
                Amount::Number(Number::from(value))
            }
        })*
    };
}

amount_from_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(n) => Amount::Number(n),
            None => Amount::Text(value.to_string()),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Text(value.to_string())
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Text(value)
    }
}

/// Payload for [`AmwalClient::create_payment`](crate::AmwalClient::create_payment).
///
/// # Examples
///
/// ```
/// use amwal::PaymentRequest;
///
/// let request = PaymentRequest::new(100)
///     .with_description("Order #42")
///     .with_client_phone_number("+966 50 123 4567");
///
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["amount"], 100);
/// assert!(json.get("language").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Normalized to E.164 before sending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone_number: Option<String>,
    /// Additional gateway fields, sent as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentRequest {
    pub fn new(amount: impl Into<Amount>) -> Self {
        Self {
            amount: Some(amount.into()),
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_client_email(mut self, email: impl Into<String>) -> Self {
        self.client_email = Some(email.into());
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_client_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.client_phone_number = Some(phone.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Payload for [`AmwalClient::refund_payment`](crate::AmwalClient::refund_payment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefundRequest {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RefundRequest {
    pub fn new(transaction_id: impl Into<String>, refund_amount: impl Into<Amount>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            refund_amount: Some(refund_amount.into()),
            extra: Map::new(),
        }
    }
}

/// A created payment link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLink {
    /// The environment reported by the gateway.
    pub environment: Option<String>,
    pub payment_url: String,
    pub payment_link_id: Option<String>,
}

/// Which resource [`AmwalClient::get_details`](crate::AmwalClient::get_details) reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailsSource {
    /// `payment_links/{id}/details`
    #[default]
    PaymentLink,
    /// `transactions/{id}`
    Transaction,
}
