//! Typed client configuration.
//!
//! The credentials and the API base URL are fixed once a client is built; the
//! retry, timeout and origin knobs live in [`ClientOptions`] and may be changed
//! through [`AmwalClient::options_mut`](crate::AmwalClient::options_mut).

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Base URL used when no `api_url` is configured.
pub const DEFAULT_API_URL: &str = "https://backend.sa.amwal.tech";

/// Overall request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of retries after a transport failure used when none is configured.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Time allowed for establishing a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The deployment the client talks to.
///
/// Development, local and test environments skip TLS certificate verification
/// and the client-side rate limiter. Every other value, including unknown ones,
/// is treated as live.
///
/// # Examples
///
/// ```
/// use amwal::Environment;
///
/// let env: Environment = "Sandbox".parse().unwrap();
/// assert_eq!(env, Environment::Sandbox);
/// assert!(env.is_live());
/// assert!(!Environment::Test.is_live());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
    Development,
    Local,
    Test,
    Other(String),
}

impl Environment {
    pub fn as_str(&self) -> &str {
        match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
            Environment::Development => "development",
            Environment::Local => "local",
            Environment::Test => "test",
            Environment::Other(name) => name,
        }
    }

    /// Returns `true` unless this is a development, local or test environment.
    pub fn is_live(&self) -> bool {
        !matches!(
            self,
            Environment::Development | Environment::Local | Environment::Test
        )
    }

    /// Whether TLS certificates are verified. Only live environments verify.
    pub fn verifies_tls(&self) -> bool {
        self.is_live()
    }

    /// Whether the client-side rate limiter applies.
    pub fn enforces_rate_limit(&self) -> bool {
        self.is_live()
    }

    /// The gateway base URL for this environment.
    ///
    /// Only a production endpoint is published, so every environment resolves
    /// to it unless an explicit URL is configured.
    pub fn default_api_url(&self) -> &'static str {
        DEFAULT_API_URL
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let env = match s.trim().to_ascii_lowercase().as_str() {
            "production" => Environment::Production,
            "sandbox" => Environment::Sandbox,
            "development" => Environment::Development,
            "local" => Environment::Local,
            "test" => Environment::Test,
            _ => Environment::Other(s.trim().to_string()),
        };
        Ok(env)
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(env) => env,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Environment {
    fn from(value: &str) -> Self {
        Environment::from(value.to_string())
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The merchant key pair. Held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    secret_key: String,
    public_key: String,
}

impl Credentials {
    /// Builds a key pair, trimming surrounding whitespace from both keys.
    pub(crate) fn new(secret_key: &str, public_key: &str) -> Self {
        Self {
            secret_key: secret_key.trim().to_string(),
            public_key: public_key.trim().to_string(),
        }
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Settings that may change after the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Overall timeout of a single attempt.
    pub timeout: Duration,
    /// Retries after a transport failure; `0` disables retrying.
    pub max_retries: usize,
    /// `Origin` header used by `create_payment` when no origin is passed.
    pub default_origin: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            default_origin: None,
        }
    }
}

/// The validated configuration owned by an [`AmwalClient`](crate::AmwalClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    credentials: Credentials,
    api_url: String,
    environment: Environment,
    log_file: Option<PathBuf>,
    pub(crate) options: ClientOptions,
}

impl ClientConfig {
    pub(crate) fn new(
        credentials: Credentials,
        api_url: Option<&str>,
        environment: Environment,
        log_file: Option<PathBuf>,
        options: ClientOptions,
    ) -> Self {
        let api_url = match api_url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => url,
            None => environment.default_api_url(),
        };

        Self {
            credentials,
            api_url: api_url.trim_end_matches('/').to_string(),
            environment,
            log_file,
            options,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The base URL, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}
