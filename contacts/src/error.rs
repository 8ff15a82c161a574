//! Error types for the `contacts` crate.
//!
//! Errors are modeled as a root `Error` struct holding an `error_kind` tree
//! and the original error as `source`. Responses the server rejected carry an
//! [`ApiError`] as their source so callers can inspect the status code,
//! headers and body.

use std::error::Error as StdError;
use std::fmt;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;

/// Top-level error type for the contacts client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors a call can produce.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Transport(TransportErrorKind),
    Api(ApiErrorKind),
    /// The server answered 2xx but the body was not the expected JSON.
    Decode,
}

/// Problems with the call itself, detected before any request is sent.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    InvalidUrl,
    InvalidHeader,
}

#[derive(Debug, PartialEq)]
pub enum TransportErrorKind {
    Network,
    /// A client middleware (e.g. token acquisition) failed.
    Middleware,
    Canceled,
    DeadlineExceeded,
}

#[derive(Debug, PartialEq)]
pub enum ApiErrorKind {
    /// HTTP 304. Not a failure of the call; the cached copy is still current.
    NotModified,
    /// Any other non-2xx status.
    Status,
}

/// A response the server did not answer with 2xx.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub code: u16,
    /// Server supplied message, when the body was a Google error envelope.
    pub message: Option<String>,
    /// Individual error items from the error envelope.
    pub errors: Vec<ErrorItem>,
    /// Raw response body.
    pub body: String,
    pub headers: HeaderMap,
}

/// One entry of the `errors` array of a Google error envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

impl ApiError {
    /// Build from a rejected response. The status code is always the HTTP
    /// status, whatever code the envelope claims.
    pub(crate) fn from_response(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        let (message, errors) = match envelope {
            Some(envelope) => (envelope.error.message, envelope.error.errors),
            None => (None, Vec::new()),
        };

        Self {
            code: status.as_u16(),
            message,
            errors,
            body,
            headers,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Contacts API error {}", self.code)?;
        match &self.message {
            Some(message) => write!(f, ": {}", message)?,
            None if !self.body.is_empty() => write!(f, ": {}", self.body)?,
            None => {}
        }
        for item in &self.errors {
            write!(f, ", {}", item.reason)?;
        }
        Ok(())
    }
}

impl StdError for ApiError {}

impl Error {
    /// The rejected response, for `ErrorKind::Api` errors.
    pub fn api_error(&self) -> Option<&ApiError> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<ApiError>())
    }

    /// HTTP status code of the rejected response, if there was one.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.code)
    }

    /// True when the server answered 304 Not Modified.
    pub fn is_not_modified(&self) -> bool {
        self.error_kind == ErrorKind::Api(ApiErrorKind::NotModified)
    }

    pub fn is_canceled(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::Transport(TransportErrorKind::Canceled)
                | ErrorKind::Transport(TransportErrorKind::DeadlineExceeded)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "Call config error: {:?}", kind)?,
            ErrorKind::Transport(kind) => write!(f, "Transport error: {:?}", kind)?,
            ErrorKind::Api(_) => write!(f, "API error")?,
            ErrorKind::Decode => write!(f, "Decode error")?,
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
        // Builder errors happen before anything reaches the network.
        let error_kind = if err.is_builder() {
            ErrorKind::Config(ConfigErrorKind::InvalidUrl)
        } else if err.is_decode() {
            ErrorKind::Decode
        } else {
            ErrorKind::Transport(TransportErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => Error {
                source: Some(err.into()),
                error_kind: ErrorKind::Transport(TransportErrorKind::Middleware),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Decode,
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

/// Helper function to create transport errors.
pub fn transport_error(kind: TransportErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Transport(kind),
    }
}

/// Helper function to create errors for rejected responses.
pub fn api_error(api_error: ApiError) -> Error {
    let kind = if api_error.code == StatusCode::NOT_MODIFIED.as_u16() {
        ApiErrorKind::NotModified
    } else {
        ApiErrorKind::Status
    };

    Error {
        source: Some(Box::new(api_error)),
        error_kind: ErrorKind::Api(kind),
    }
}
