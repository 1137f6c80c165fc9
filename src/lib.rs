//! # Amwal - a client for the Amwal payment gateway
//!
//! Amwal builds authenticated requests to the payment gateway, validates input
//! before it reaches the network, retries transport failures with exponential
//! backoff, throttles repeated calls per endpoint, and turns every gateway
//! response into either a decoded JSON object or a typed [`Error`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use amwal::{AmwalClient, PaymentRequest, RefundRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), amwal::Error> {
//!     let client = AmwalClient::create("secret-key", "public-key", "sandbox")?;
//!
//!     if !client.test_connection().await {
//!         eprintln!("Merchant keys were rejected");
//!     }
//!
//!     let payment = PaymentRequest::new(100)
//!         .with_language("en")
//!         .with_client_phone_number("+966 50 123 4567");
//!     let link = client
//!         .create_payment(&payment, "8ff41fae-709a-46da-9b27-a5d2b1059e67", None)
//!         .await?;
//!     println!("Payment URL: {}", link.payment_url);
//!
//!     let transaction = client
//!         .get_transaction_details("0f0a7c6a-ca74-4fae-8d9c-290b722b6750")
//!         .await?;
//!     println!("Transaction: {:?}", transaction);
//!
//!     let refund = RefundRequest::new("0f0a7c6a-ca74-4fae-8d9c-290b722b6750", 10);
//!     println!("Refund: {:?}", client.refund_payment(&refund).await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Errors are grouped into four kinds, see [`ErrorKind`]:
//!
//! ```no_run
//! use amwal::{AmwalClient, Error, PaymentRequest};
//!
//! # async fn example(client: AmwalClient) {
//! match client.create_payment(&PaymentRequest::new(0), "store", None).await {
//!     Ok(link) => println!("{}", link.payment_url),
//!     Err(Error::Validation { message, .. }) => eprintln!("Bad input: {}", message),
//!     Err(Error::Network { source, attempts, .. }) => {
//!         eprintln!("Gave up after {} attempts: {}", attempts, source);
//!     }
//!     Err(e) if e.is_rate_limited() => eprintln!("Slow down"),
//!     Err(e) => eprintln!("Gateway error {}: {:?}", e, e.context()),
//! }
//! # }
//! ```
//!
//! ## Environments
//!
//! Development, local and test environments skip TLS certificate
//! verification and the client-side rate limiter. All other environments
//! verify certificates and allow one call per endpoint and key every 60
//! seconds.

mod client;
pub mod config;
mod error;
mod executor;
pub mod log;
pub mod metadata;
pub mod phone;
pub mod rate_limit;
mod response;
pub mod retry;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{AmwalClient, ClientBuilder};
pub use config::{ClientConfig, ClientOptions, Credentials, Environment};
pub use error::{Context, Error, ErrorKind, Result};
pub use rate_limit::RateLimiter;
pub use response::HttpOutcome;
pub use retry::{RetryPolicy, Sleeper};
pub use transport::{RawResponse, Transport, TransportError};
pub use types::{Amount, DetailsSource, PaymentLink, PaymentRequest, RefundRequest};
