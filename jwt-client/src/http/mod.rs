//! HTTP client building with bearer token middleware.

mod client;
mod middleware;

pub use client::{AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig};
pub use middleware::BearerAuthMiddleware;
