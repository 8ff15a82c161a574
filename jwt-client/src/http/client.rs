//! Authenticated HTTP client builder with middleware.

use std::sync::Arc;
use std::time::Duration;

use reqwest_middleware::ClientBuilder;

use super::BearerAuthMiddleware;
use crate::error::Error;
use crate::token::TokenSource;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("jwt-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Authenticated HTTP client with middleware.
pub type AuthenticatedClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for creating HTTP clients that attach OAuth2 access tokens.
///
/// Without a token source the built client sends requests unauthenticated,
/// which is useful against local test servers.
pub struct AuthenticatedClientBuilder {
    config: HttpClientConfig,
    token_source: Option<Arc<TokenSource>>,
}

impl AuthenticatedClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            token_source: None,
        }
    }

    /// Set the source of access tokens.
    pub fn with_token_source(mut self, token_source: Arc<TokenSource>) -> Self {
        self.token_source = Some(token_source);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<AuthenticatedClient, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let builder = ClientBuilder::new(client);
        let client_with_middleware = match self.token_source {
            Some(source) => builder.with(BearerAuthMiddleware::new(source)).build(),
            None => builder.build(),
        };

        Ok(client_with_middleware)
    }
}

impl Default for AuthenticatedClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
