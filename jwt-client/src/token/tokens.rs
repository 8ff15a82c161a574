//! OAuth access token types.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// How long before the recorded expiry a token is already treated as expired.
const EXPIRY_BUFFER_SECS: i64 = 10;

/// An access token obtained from the token endpoint.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// When the access token expires. `None` means the server gave no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "Bearer").
    pub token_type: String,
}

impl Tokens {
    /// Check if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|expires| expires <= now + chrono::Duration::seconds(EXPIRY_BUFFER_SECS))
            .unwrap_or(false)
    }

    /// Value for the `Authorization` header.
    ///
    /// Token types are case-insensitive on the wire; the common spellings of
    /// "bearer" are normalized and an empty type is treated as bearer.
    pub fn authorization_value(&self) -> String {
        let token_type = if self.token_type.is_empty()
            || self.token_type.eq_ignore_ascii_case("bearer")
        {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", token_type, self.access_token.expose_secret())
    }
}

/// Successful token endpoint response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub(crate) fn into_tokens(self, now: DateTime<Utc>) -> Tokens {
        let expires_at = self
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| now + chrono::Duration::seconds(secs));

        Tokens {
            access_token: SecretString::new(self.access_token),
            expires_at,
            token_type: self.token_type,
        }
    }
}
