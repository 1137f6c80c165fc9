//! The gateway client.
//!
//! [`AmwalClient`] exposes the gateway operations. Each one validates its
//! input, builds the request, passes the rate limiter, sends with retries and
//! decodes the response. Use [`ClientBuilder`] to configure and create clients.

use crate::config::{ClientConfig, ClientOptions, Credentials, Environment};
use crate::executor::HttpExecutor;
use crate::log::{context, EventLog, FileLogSink, LogSink};
use crate::metadata::{self, AuthHeaders, RequestMetadata};
use crate::rate_limit::RateLimiter;
use crate::response::{handle_response, HttpOutcome};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{DetailsSource, PaymentLink, PaymentRequest, RefundRequest};
use crate::{validation, Error, Result};
use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A client for the Amwal payment gateway.
///
/// # Examples
///
/// ```no_run
/// use amwal::{AmwalClient, Environment, PaymentRequest};
///
/// # async fn example() -> Result<(), amwal::Error> {
/// let client = AmwalClient::builder("secret-key", "public-key")
///     .environment(Environment::Sandbox)
///     .default_origin("https://shop.example")
///     .build()?;
///
/// let link = client
///     .create_payment(
///         &PaymentRequest::new(100).with_description("Order #42"),
///         "8ff41fae-709a-46da-9b27-a5d2b1059e67",
///         None,
///     )
///     .await?;
/// println!("Pay at {}", link.payment_url);
///
/// if let Some(id) = &link.payment_link_id {
///     let details = client.get_payment_details(id).await?;
///     println!("Details: {:?}", details);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AmwalClient {
    config: ClientConfig,
    auth: AuthHeaders,
    executor: HttpExecutor,
    log: EventLog,
}

impl AmwalClient {
    /// Creates a new `ClientBuilder` for the given key pair.
    pub fn builder(secret_key: impl Into<String>, public_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(secret_key, public_key)
    }

    /// Builds a client with default options for `environment`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a key is blank.
    pub fn create(
        secret_key: impl Into<String>,
        public_key: impl Into<String>,
        environment: impl Into<Environment>,
    ) -> Result<Self> {
        ClientBuilder::new(secret_key, public_key)
            .environment(environment)
            .build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        self.config.credentials()
    }

    pub fn environment(&self) -> &Environment {
        self.config.environment()
    }

    pub fn api_url(&self) -> &str {
        self.config.api_url()
    }

    pub fn options(&self) -> &ClientOptions {
        self.config.options()
    }

    /// Mutable access to the options that may change after construction.
    ///
    /// Credentials, the base URL and the environment are fixed.
    pub fn options_mut(&mut self) -> &mut ClientOptions {
        &mut self.config.options
    }

    /// Checks the merchant key pair against the gateway.
    ///
    /// # Errors
    ///
    /// Returns any error the call produced.
    pub async fn validate_merchant(&self) -> Result<Map<String, Value>> {
        let credentials = self.config.credentials();
        let url = metadata::validate_merchant_url(self.config.api_url());
        // The gateway expects the public key as Origin on this endpoint.
        let headers = metadata::default_headers(Some(credentials.public_key()))?;
        let payload = json!({
            "api_key": credentials.secret_key(),
            "merchant_id": credentials.public_key(),
        });

        match self.send(Method::POST, url, headers, Some(&payload)).await {
            Ok(outcome) => {
                self.log.info(
                    "Merchant validation successful",
                    context! { "merchant_id" => credentials.public_key() },
                );
                Ok(outcome.into_body())
            }
            Err(e) => {
                self.log.error(
                    "Merchant validation failed",
                    context! { "error" => e.to_string() },
                );
                Err(e)
            }
        }
    }

    /// Returns `true` if [`validate_merchant`](Self::validate_merchant) succeeds.
    ///
    /// The error is discarded; call `validate_merchant` to inspect it.
    pub async fn test_connection(&self) -> bool {
        self.validate_merchant().await.is_ok()
    }

    /// Creates a payment link for `store_id`.
    ///
    /// The `Origin` header is `origin` if given, otherwise the configured
    /// default origin. The phone number, if any, is sent normalized to E.164.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call if the request is
    /// invalid, and an [`Error::Api`] if the gateway's success response has no
    /// `url`.
    pub async fn create_payment(
        &self,
        request: &PaymentRequest,
        store_id: &str,
        origin: Option<&str>,
    ) -> Result<PaymentLink> {
        let payload = validation::validate_payment_data(request)?;
        let origin = origin.or(self.config.options().default_origin.as_deref());
        let url = metadata::create_payment_url(self.config.api_url(), store_id);
        let headers = self.auth.headers(origin)?;

        self.log.info(
            "Creating payment",
            context! {
                "merchant_id" => self.config.credentials().public_key(),
                "amount" => serde_json::to_value(&payload.amount).unwrap_or_default(),
            },
        );

        let outcome = self.send(Method::POST, url, headers, Some(&payload)).await?;

        let payment_url = match outcome.str_field("url") {
            Some(url) => url.to_string(),
            None => {
                let response = Value::Object(outcome.body.clone());
                self.log.error(
                    "Invalid response from payment creation",
                    context! { "response" => response.clone() },
                );
                return Err(Error::Api {
                    message: "Invalid response from payment gateway".to_string(),
                    status: None,
                    context: context! {
                        "response" => response,
                        "environment" => self.config.environment().as_str(),
                    },
                });
            }
        };

        let link = PaymentLink {
            environment: string_field(&outcome.body, "environment"),
            payment_url,
            payment_link_id: string_field(&outcome.body, "payment_link_id"),
        };

        self.log.info(
            "Payment created successfully",
            context! { "payment_link_id" => link.payment_link_id.clone() },
        );

        Ok(link)
    }

    /// Reads a payment link's details.
    pub async fn get_payment_details(&self, id: &str) -> Result<Map<String, Value>> {
        self.get_details(id, DetailsSource::PaymentLink).await
    }

    /// Reads a single transaction.
    pub async fn get_transaction_details(&self, id: &str) -> Result<Map<String, Value>> {
        self.get_details(id, DetailsSource::Transaction).await
    }

    /// Reads a payment link or a transaction, returning the body verbatim.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `id` is not 10 to 100 characters of
    /// `[a-zA-Z0-9_-]`.
    pub async fn get_details(&self, id: &str, source: DetailsSource) -> Result<Map<String, Value>> {
        validation::validate_transaction_id(id)?;

        let url = match source {
            DetailsSource::PaymentLink => {
                metadata::payment_link_details_url(self.config.api_url(), id)
            }
            DetailsSource::Transaction => metadata::transaction_url(self.config.api_url(), id),
        };
        let headers = self.auth.headers(None)?;

        let outcome = self.send::<Value>(Method::GET, url, headers, None).await?;
        Ok(outcome.into_body())
    }

    /// Refunds (part of) a transaction, returning the body verbatim.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the transaction id is missing or is not a
    /// well-formed id.
    pub async fn refund_payment(&self, request: &RefundRequest) -> Result<Map<String, Value>> {
        validation::validate_refund_data(request)?;
        validation::validate_transaction_id(&request.transaction_id)?;

        let url = metadata::refund_url(self.config.api_url(), &request.transaction_id);
        let headers = self.auth.headers(None)?;

        self.log.info(
            "Processing refund",
            context! { "transaction_id" => request.transaction_id.as_str() },
        );

        let outcome = self.send(Method::POST, url, headers, Some(request)).await?;
        Ok(outcome.into_body())
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        payload: Option<&T>,
    ) -> Result<HttpOutcome> {
        let options = self.config.options();
        let mut request = RequestMetadata::new(method, url)
            .with_headers(headers)
            .with_timeout(options.timeout);
        if let Some(payload) = payload {
            request = request.with_json(payload)?;
        }

        let exchange = self
            .executor
            .execute(&request, RetryPolicy::exponential(options.max_retries))
            .await?;
        handle_response(exchange, self.config.environment())
    }
}

/// Returns the field as a string, stringifying numbers; `None` when absent or null.
fn string_field(body: &Map<String, Value>, name: &str) -> Option<String> {
    match body.get(name)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builder for configuring and creating an [`AmwalClient`].
///
/// # Examples
///
/// ```no_run
/// use amwal::{AmwalClient, Environment};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), amwal::Error> {
/// let client = AmwalClient::builder("secret-key", "public-key")
///     .environment(Environment::Production)
///     .timeout(Duration::from_secs(15))
///     .max_retries(2)
///     .log_file("logs/amwalpay.log")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    secret_key: String,
    public_key: String,
    api_url: Option<String>,
    environment: Environment,
    options: ClientOptions,
    log_file: Option<PathBuf>,
    log_sink: Option<Arc<dyn LogSink>>,
    transport: Option<Arc<dyn Transport>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new(secret_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            public_key: public_key.into(),
            api_url: None,
            environment: Environment::default(),
            options: ClientOptions::default(),
            log_file: None,
            log_sink: None,
            transport: None,
            sleeper: None,
            rate_limiter: None,
        }
    }

    /// Overrides the gateway base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<Environment>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Sets the overall timeout of each attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Sets how many times a transport failure is retried.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.options.max_retries = max_retries;
        self
    }

    /// Sets the `Origin` used by `create_payment` when none is passed.
    pub fn default_origin(mut self, origin: impl Into<String>) -> Self {
        self.options.default_origin = Some(origin.into());
        self
    }

    /// Appends log records to this file. Its directory is created if needed.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Sends log records to a custom sink. Takes precedence over `log_file`.
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Replaces the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces how the client waits between retries.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Uses this limiter instead of the process-wide one.
    pub fn rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    /// Builds the configured `AmwalClient`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a key is blank, the API URL is malformed,
    /// or the log file cannot be written; and an error if the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<AmwalClient> {
        validation::validate_config(
            &self.secret_key,
            &self.public_key,
            self.api_url.as_deref(),
            self.log_file.as_deref(),
        )?;

        let config = ClientConfig::new(
            Credentials::new(&self.secret_key, &self.public_key),
            self.api_url.as_deref(),
            self.environment,
            self.log_file,
            self.options,
        );

        let auth = AuthHeaders::new(config.credentials())?;

        let sink = self.log_sink.or_else(|| {
            config
                .log_file()
                .map(|path| Arc::new(FileLogSink::new(path)) as Arc<dyn LogSink>)
        });
        let log = EventLog::new(config.environment().clone(), sink);

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.environment())?),
        };

        let executor = HttpExecutor::new(
            transport,
            self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
            self.rate_limiter.unwrap_or_else(RateLimiter::shared),
            config.environment().clone(),
            config.credentials().secret_key().to_string(),
            log.clone(),
        );

        Ok(AmwalClient {
            config,
            auth,
            executor,
            log,
        })
    }
}
