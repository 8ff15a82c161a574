//! JWT configuration for two-legged OAuth2 with a service account.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::ExposeSecret;

use crate::error::{config_error, ConfigErrorKind, Error, ErrorKind};
use crate::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use crate::key::ServiceAccountKey;
use crate::token::claims::AssertionClaims;
use crate::token::TokenSource;

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Assertions are back-dated to tolerate clock skew with the token server.
const ISSUED_AT_SKEW_SECS: i64 = 10;

/// Timeout for the HTTP client used to reach the token endpoint.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to mint access tokens for one service account.
///
/// The configuration is validated when it is built: the key JSON, the RSA
/// private key and the scope list are all checked before any request is made.
/// A `JwtConfig` is never mutated after construction; [`JwtConfig::with_subject`]
/// returns an independent copy.
#[derive(Clone)]
pub struct JwtConfig {
    email: String,
    signing_key: EncodingKey,
    private_key_id: Option<String>,
    scopes: Vec<String>,
    token_uri: String,
    subject: Option<String>,
}

impl JwtConfig {
    /// Build a configuration from key data in JSON format.
    pub fn from_json(keydata: &[u8], scopes: &[&str]) -> Result<Self, Error> {
        let key = ServiceAccountKey::from_json(keydata)?;
        Self::from_key(&key, scopes)
    }

    /// Build a configuration from a key file containing JSON key data.
    pub fn from_keyfile(keyfile: impl AsRef<Path>, scopes: &[&str]) -> Result<Self, Error> {
        let key = ServiceAccountKey::from_keyfile(keyfile)?;
        Self::from_key(&key, scopes)
    }

    /// Build a configuration from an already parsed key.
    pub fn from_key(key: &ServiceAccountKey, scopes: &[&str]) -> Result<Self, Error> {
        let scopes: Vec<String> = scopes
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if scopes.is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingScope,
                "at least one OAuth scope is required",
            ));
        }

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Config(ConfigErrorKind::InvalidPrivateKey),
            })?;

        Ok(Self {
            email: key.client_email.clone(),
            signing_key,
            private_key_id: key.private_key_id.clone().filter(|id| !id.is_empty()),
            scopes,
            token_uri: key.token_uri.clone(),
            subject: None,
        })
    }

    /// Copy of this configuration that impersonates `subject`.
    pub fn with_subject(&self, subject: impl Into<String>) -> Self {
        let mut config = self.clone();
        config.subject = Some(subject.into()).filter(|s: &String| !s.is_empty());
        config
    }

    /// Service account email used as the assertion issuer.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// The impersonated user, if any.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Sign a JWT bearer assertion issued at `now`.
    pub(crate) fn assertion(&self, now: DateTime<Utc>) -> Result<String, Error> {
        // exp - iat must not exceed one hour.
        let issued = now.timestamp() - ISSUED_AT_SKEW_SECS;
        let claims = AssertionClaims {
            iss: self.email.clone(),
            scope: self.scopes.join(" "),
            aud: self.token_uri.clone(),
            exp: issued + ASSERTION_LIFETIME_SECS,
            iat: issued,
            sub: self.subject.clone(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        Ok(encode(&header, &claims, &self.signing_key)?)
    }

    /// A caching token source for this configuration that talks to the token
    /// endpoint through `http`.
    pub fn token_source(&self, http: reqwest::Client) -> TokenSource {
        TokenSource::new(self.clone(), http)
    }

    /// Build an HTTP client that attaches access tokens for this configuration
    /// to every request.
    pub fn client(&self) -> Result<AuthenticatedClient, Error> {
        self.client_builder()?.build()
    }

    /// Client builder with this configuration's token source already set, for
    /// callers that need to adjust the API client (e.g. its timeout).
    pub fn client_builder(&self) -> Result<AuthenticatedClientBuilder, Error> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()?;
        Ok(AuthenticatedClientBuilder::new().with_token_source(Arc::new(self.token_source(http))))
    }

    /// Like [`JwtConfig::client`], using `http` for the token exchange.
    pub fn client_with(&self, http: reqwest::Client) -> Result<AuthenticatedClient, Error> {
        AuthenticatedClientBuilder::new()
            .with_token_source(Arc::new(self.token_source(http)))
            .build()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("email", &self.email)
            .field("private_key_id", &self.private_key_id)
            .field("scopes", &self.scopes)
            .field("token_uri", &self.token_uri)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}
