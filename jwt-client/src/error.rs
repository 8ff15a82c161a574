//! Error types for the `jwt-client` crate.
//!
//! Follows the layered pattern used across the workspace: a root `Error` struct
//! holding an error kind tree and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for jwt-client crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in jwt-client.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Token(TokenErrorKind),
    Http(HttpErrorKind),
}

/// Errors detected while building a configuration. None of these involve
/// network I/O.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    /// Key data is not valid service-account JSON.
    InvalidKey,
    /// Key JSON `type` is something other than `service_account`.
    UnsupportedKeyType,
    /// `private_key` is not a usable RSA PEM key.
    InvalidPrivateKey,
    MissingScope,
    MissingKeyfile,
    UnreadableKeyfile,
}

/// Errors from acquiring access tokens.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    Signing,
    ExchangeFailed,
    InvalidResponse,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// True for errors raised while validating key material or scopes.
    pub fn is_config(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Config(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "JWT config error: {:?}", kind)?,
            ErrorKind::Token(kind) => write!(f, "Token error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Token(TokenErrorKind::Signing),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}
