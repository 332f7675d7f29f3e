//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_API_URL` - Base URL of the collections API (default: `http://127.0.0.1:3000`)
//! - `STOREFRONT_API_TOKEN` - Bearer token sent to the collections API
//! - `STOREFRONT_REQUEST_TIMEOUT_SECS` - Remote request timeout (default: 10)
//! - `STOREFRONT_IDENTITY_HINT_TTL_SECS` - How long a persisted sign-in hint stays valid (default: 7 days)
//! - `STOREFRONT_DATA_DIR` - Directory for guest collections and the identity hint (default: `.marketplace`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Identity hints expire after 7 days, matching the session lifetime.
const DEFAULT_IDENTITY_HINT_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_DATA_DIR: &str = ".marketplace";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the collections API
    pub api_url: Url,
    /// Optional bearer token for the collections API
    pub api_token: Option<SecretString>,
    /// Timeout applied to every remote request
    pub request_timeout: Duration,
    /// Lifetime of a persisted identity hint
    pub identity_hint_ttl: Duration,
    /// Directory used by file-backed local storage
    pub data_dir: PathBuf,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("identity_hint_ttl", &self.identity_hint_ttl)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        #[allow(clippy::expect_used)]
        let api_url = Url::parse(DEFAULT_API_URL).expect("default API URL is valid");

        Self {
            api_url,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            identity_hint_ttl: Duration::from_secs(DEFAULT_IDENTITY_HINT_TTL_SECS),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("STOREFRONT_API_URL", DEFAULT_API_URL))?;
        let api_token = get_optional_env("STOREFRONT_API_TOKEN").map(SecretString::from);
        let request_timeout = Duration::from_secs(get_u64_or_default(
            "STOREFRONT_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        let identity_hint_ttl = Duration::from_secs(get_u64_or_default(
            "STOREFRONT_IDENTITY_HINT_TTL_SECS",
            DEFAULT_IDENTITY_HINT_TTL_SECS,
        )?);
        let data_dir = PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR));

        Ok(Self {
            api_url,
            api_token,
            request_timeout,
            identity_hint_ttl,
            data_dir,
        })
    }

    /// Use a different collections API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute http(s) URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate the collections API base URL.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), msg);

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("must have a host".to_string()));
    }
    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a numeric environment variable with a default value.
fn get_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
