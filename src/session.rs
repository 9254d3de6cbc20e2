//! Explicit access credentials for the backend API.
//!
//! Credentials are handed to API clients at construction time; nothing in
//! the crate reads tokens from ambient storage.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Errors raised while building a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The access token is blank.
    #[error("access token must not be empty")]
    EmptyToken,
}

/// Opaque bearer token. Its `Debug` output never reveals the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] when the token is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, SessionError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the secret token text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A bearer token with an optional expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: AccessToken,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Creates a credential that never expires.
    #[must_use]
    pub const fn new(token: AccessToken) -> Self {
        Self {
            token,
            expires_at: None,
        }
    }

    /// Sets the expiry instant.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns the token.
    #[must_use]
    pub const fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Returns the expiry instant, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns `true` once `now` has reached the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose())
    }
}
