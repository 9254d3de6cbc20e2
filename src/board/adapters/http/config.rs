//! Backend connection settings.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_VAR: &str = "TRELLIS_BACKEND_URL";

/// Environment variable holding the request timeout in seconds.
pub const HTTP_TIMEOUT_VAR: &str = "TRELLIS_HTTP_TIMEOUT_SECS";

/// Base URL used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:80";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while reading backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The base URL is not an `http://` or `https://` URL.
    #[error("backend URL must start with http:// or https://, got {0:?}")]
    InvalidBackendUrl(String),

    /// The timeout is not a positive whole number of seconds.
    #[error("request timeout must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Creates settings; trailing slashes are stripped from the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBackendUrl`] for a non-HTTP URL and
    /// [`ConfigError::InvalidTimeout`] for a zero timeout.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, ConfigError> {
        let raw = base_url.as_ref().trim();
        let trimmed = raw.trim_end_matches('/');
        let has_host = ["http://", "https://"]
            .iter()
            .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|host| !host.is_empty()));
        if !has_host {
            return Err(ConfigError::InvalidBackendUrl(raw.to_owned()));
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!("{}", timeout.as_secs())));
        }
        Ok(Self {
            base_url: trimmed.to_owned(),
            timeout,
        })
    }

    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset or blank values take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|text| !text.trim().is_empty());
        let base_url = value(BACKEND_URL_VAR).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
        let timeout = match value(HTTP_TIMEOUT_VAR) {
            Some(text) => parse_timeout(&text)?,
            None => DEFAULT_TIMEOUT,
        };
        Self::new(base_url, timeout)
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Joins a route path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn parse_timeout(text: &str) -> Result<Duration, ConfigError> {
    text.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidTimeout(text.to_owned()))
}
