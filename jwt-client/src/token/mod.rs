//! Access token acquisition and caching.

pub(crate) mod claims;
mod source;
mod tokens;

pub use source::{TokenSource, JWT_BEARER_GRANT_TYPE};
pub use tokens::Tokens;
