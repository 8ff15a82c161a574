//! Middleware that authorizes outgoing requests with cached access tokens.

use std::sync::Arc;

use async_trait::async_trait;
use ::http::Extensions;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use tracing::warn;

use crate::token::TokenSource;

/// Sets `Authorization` on every request from a shared [`TokenSource`].
///
/// Token acquisition failures abort the request before it is sent.
#[derive(Clone)]
pub struct BearerAuthMiddleware {
    source: Arc<TokenSource>,
}

impl BearerAuthMiddleware {
    pub fn new(source: Arc<TokenSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Middleware for BearerAuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let tokens = self.source.token().await.map_err(|e| {
            warn!("Failed to obtain access token: {}", e);
            reqwest_middleware::Error::middleware(e)
        })?;

        let mut value = HeaderValue::from_str(&tokens.authorization_value())
            .map_err(reqwest_middleware::Error::middleware)?;
        value.set_sensitive(true);
        req.headers_mut().insert(AUTHORIZATION, value);

        next.run(req, extensions).await
    }
}
