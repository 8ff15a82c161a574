//! # jwt-client
//!
//! Builds HTTP clients that authenticate to Google APIs with JSON Web Tokens
//! using two-legged OAuth2 (the JWT bearer grant) for a service account:
//! - Service-account key parsing from bytes or key files
//! - RS256 assertion signing and token exchange, with token caching
//! - Optional impersonation of a user ("subject") through domain-wide delegation
//! - A `reqwest-middleware` client that attaches bearer tokens to every request
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = jwt_client::new_from_keyfile(
//!     "service-account.json",
//!     &["https://www.googleapis.com/auth/contacts.readonly"],
//! )?;
//!
//! // Many clients from one parsed key
//! let source = jwt_client::Source::from_keyfile("service-account.json", &scopes)?;
//! let alice = source.client_with_subject("alice@example.com")?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod key;
pub mod source;
pub mod token;

use std::path::Path;

pub use config::JwtConfig;
pub use error::{Error, ErrorKind};
pub use http::{AuthenticatedClient, AuthenticatedClientBuilder};
pub use key::ServiceAccountKey;
pub use source::Source;
pub use token::{TokenSource, Tokens};

/// Returns an OAuth2 authenticating HTTP client for the given key data and
/// scope(s). The key data must be in JSON format.
pub fn new(keydata: &[u8], scopes: &[&str]) -> Result<AuthenticatedClient, Error> {
    JwtConfig::from_json(keydata, scopes)?.client()
}

/// Returns an OAuth2 authenticating HTTP client for the given key data,
/// subject and scope(s).
pub fn new_with_subject(
    keydata: &[u8],
    subject: &str,
    scopes: &[&str],
) -> Result<AuthenticatedClient, Error> {
    JwtConfig::from_json(keydata, scopes)?
        .with_subject(subject)
        .client()
}

/// Returns an OAuth2 authenticating HTTP client for the given key file and
/// scope(s).
pub fn new_from_keyfile(
    keyfile: impl AsRef<Path>,
    scopes: &[&str],
) -> Result<AuthenticatedClient, Error> {
    JwtConfig::from_keyfile(keyfile, scopes)?.client()
}

/// Returns an OAuth2 authenticating HTTP client for the given key file,
/// subject and scope(s).
pub fn new_from_keyfile_with_subject(
    keyfile: impl AsRef<Path>,
    subject: &str,
    scopes: &[&str],
) -> Result<AuthenticatedClient, Error> {
    JwtConfig::from_keyfile(keyfile, scopes)?
        .with_subject(subject)
        .client()
}
