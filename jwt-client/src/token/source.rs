//! Caching source of access tokens obtained through the JWT bearer grant.

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::tokens::{TokenResponse, Tokens};
use crate::config::JwtConfig;
use crate::error::{token_error, Error, ErrorKind, TokenErrorKind};

/// OAuth2 grant type for JWT bearer assertions (RFC 7523).
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Token source that signs assertions and exchanges them for access tokens.
///
/// The most recent token is cached and handed out until it is about to
/// expire. The cache lock is held across the exchange, so concurrent callers
/// that find an expired token wait for a single refresh instead of each
/// hitting the token endpoint.
pub struct TokenSource {
    config: JwtConfig,
    http: reqwest::Client,
    cached: Mutex<Option<Tokens>>,
}

impl TokenSource {
    pub fn new(config: JwtConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            cached: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Get a valid access token, exchanging a fresh assertion if needed.
    pub async fn token(&self) -> Result<Tokens, Error> {
        let mut cached = self.cached.lock().await;

        if let Some(tokens) = cached.as_ref() {
            if !tokens.is_expired() {
                return Ok(tokens.clone());
            }
            debug!("Access token for {} expired, refreshing", self.config.email());
        }

        let tokens = self.fetch().await?;
        *cached = Some(tokens.clone());
        Ok(tokens)
    }

    async fn fetch(&self) -> Result<Tokens, Error> {
        let now = Utc::now();
        let assertion = self.config.assertion(now)?;

        debug!(
            "Requesting access token for {} (subject: {:?})",
            self.config.email(),
            self.config.subject()
        );

        let response = self
            .http
            .post(self.config.token_uri())
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Token endpoint returned {}: {}", status, body);
            return Err(token_error(
                TokenErrorKind::ExchangeFailed,
                &format!("cannot fetch token: {}\nResponse: {}", status, body),
            ));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Token(TokenErrorKind::InvalidResponse),
        })?;

        if token_response.access_token.is_empty() {
            return Err(token_error(
                TokenErrorKind::InvalidResponse,
                "server response missing access_token",
            ));
        }

        Ok(token_response.into_tokens(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use mockito::{Matcher, Server};
    use secrecy::ExposeSecret;

    const KEY_JSON: &str = include_str!("../../testdata/service_account.json");
    const SCOPE: &str = "https://www.googleapis.com/auth/contacts";

    fn config_for(token_uri: &str) -> JwtConfig {
        let mut value: serde_json::Value = serde_json::from_str(KEY_JSON).unwrap();
        value["token_uri"] = serde_json::json!(token_uri);
        JwtConfig::from_json(value.to_string().as_bytes(), &[SCOPE]).unwrap()
    }

    fn assertion_claims(body: &[u8]) -> serde_json::Value {
        let assertion = url::form_urlencoded::parse(body)
            .find(|(k, _)| k == "assertion")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let payload = assertion.split('.').nth(1).unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_fetches_and_caches_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::UrlEncoded(
                "grant_type".into(),
                JWT_BEARER_GRANT_TYPE.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.first","token_type":"Bearer","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;

        let source = config_for(&format!("{}/token", server.url()))
            .token_source(reqwest::Client::new());

        let first = source.token().await.unwrap();
        let second = source.token().await.unwrap();

        assert_eq!(first.access_token.expose_secret(), "ya29.first");
        assert_eq!(second.access_token.expose_secret(), "ya29.first");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refreshes_expired_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"ya29.short","token_type":"Bearer","expires_in":1}"#)
            .expect(2)
            .create_async()
            .await;

        let source = config_for(&format!("{}/token", server.url()))
            .token_source(reqwest::Client::new());

        // A one second lifetime is inside the expiry buffer, so every call refreshes.
        source.token().await.unwrap();
        source.token().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_subject_sent_in_assertion() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_request(|request| {
                let claims = assertion_claims(request.body().unwrap());
                claims["sub"] == "alice@example.com"
            })
            .with_status(200)
            .with_body(r#"{"access_token":"ya29.alice","token_type":"Bearer","expires_in":3600}"#)
            .create_async()
            .await;

        let source = config_for(&format!("{}/token", server.url()))
            .with_subject("alice@example.com")
            .token_source(reqwest::Client::new());

        let tokens = source.token().await.unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "ya29.alice");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#)
            .create_async()
            .await;

        let source = config_for(&format!("{}/token", server.url()))
            .token_source(reqwest::Client::new());

        let err = source.token().await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Token(TokenErrorKind::ExchangeFailed)
        );
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_missing_access_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"token_type":"Bearer","expires_in":3600}"#)
            .create_async()
            .await;

        let source = config_for(&format!("{}/token", server.url()))
            .token_source(reqwest::Client::new());

        let err = source.token().await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Token(TokenErrorKind::InvalidResponse)
        );
    }
}
