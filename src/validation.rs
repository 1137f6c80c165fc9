//! Input checks run before any network call.
//!
//! These are pure functions apart from [`validate_config`], which creates the
//! log file's directory when it does not exist yet.

use crate::phone;
use crate::types::{PaymentRequest, RefundRequest};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use url::Url;

static TRANSACTION_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{10,100}$").expect("Invalid regex for transaction id")
});

/// Checks the configuration a client is about to be built from.
///
/// # Errors
///
/// Returns a validation error if a key is missing or blank, if `api_url` is
/// given but not an absolute URL, or if the log file's directory cannot be
/// created or written to.
pub fn validate_config(
    secret_key: &str,
    public_key: &str,
    api_url: Option<&str>,
    log_file: Option<&Path>,
) -> Result<()> {
    for (name, value) in [("secret_key", secret_key), ("public_key", public_key)] {
        if value.trim().is_empty() {
            return Err(Error::validation(format!(
                "Configuration parameter '{}' is required",
                name
            )));
        }
    }

    if let Some(url) = api_url.filter(|url| !url.is_empty()) {
        if !is_valid_url(url) {
            return Err(Error::validation(format!("Invalid API URL: {}", url)));
        }
    }

    if let Some(path) = log_file {
        if !is_writable_path(path) {
            return Err(Error::validation(format!(
                "Log file not writable: {}",
                path.display()
            )));
        }
    }

    Ok(())
}

/// Checks a payment request and returns the copy that should be sent.
///
/// The caller's request is left untouched; the returned copy carries the
/// phone number normalized to E.164.
///
/// # Errors
///
/// Returns a validation error if the amount is missing, blank, not numeric or
/// not positive, if the phone number is not valid E.164 after normalization,
/// or if the callback URL is malformed.
pub fn validate_payment_data(data: &PaymentRequest) -> Result<PaymentRequest> {
    let amount = match &data.amount {
        Some(amount) if !amount.is_blank() => amount,
        _ => return Err(Error::validation("Required field 'amount' is missing")),
    };

    if !amount.is_positive() {
        return Err(Error::validation("Amount must be a positive number"));
    }

    let mut validated = data.clone();

    if let Some(phone_number) = &data.client_phone_number {
        validated.client_phone_number = Some(phone::validate_phone(phone_number)?);
    }

    if let Some(callback_url) = &data.callback_url {
        if !is_valid_url(callback_url) {
            return Err(Error::validation("Invalid callback URL"));
        }
    }

    Ok(validated)
}

/// Checks that `id` is 10 to 100 ASCII letters, digits, `_` or `-`.
pub fn validate_transaction_id(id: &str) -> Result<()> {
    if !TRANSACTION_ID_REGEX.is_match(id) {
        return Err(Error::validation("Invalid transaction ID format"));
    }
    Ok(())
}

/// Checks that a refund names the transaction it applies to.
pub fn validate_refund_data(data: &RefundRequest) -> Result<()> {
    if data.transaction_id.trim().is_empty() {
        return Err(Error::validation("Transaction ID is required for refund"));
    }
    Ok(())
}

/// Absolute URL with a scheme and a host.
fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}

fn is_writable_path(path: &Path) -> bool {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !dir.is_dir() && std::fs::create_dir_all(dir).is_err() {
        return false;
    }

    tempfile::tempfile_in(dir).is_ok()
}
