//! Claims carried by the JWT bearer grant assertion.

use serde::{Deserialize, Serialize};

/// Claim set for a Google service-account assertion (RFC 7523).
///
/// `sub` is only present when the service account impersonates a user through
/// domain-wide delegation.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub(crate) iss: String,
    pub(crate) scope: String,
    pub(crate) aud: String,
    pub(crate) exp: i64,
    pub(crate) iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sub: Option<String>,
}
