//! Reusable source of JWT authenticated HTTP clients.

use std::path::Path;

use crate::config::JwtConfig;
use crate::error::Error;
use crate::http::AuthenticatedClient;

/// A source of HTTP clients that share one parsed configuration but can differ
/// in the impersonated subject.
///
/// Key data is parsed and validated once, in [`Source::new`] or
/// [`Source::from_keyfile`]. Every client handed out afterwards owns its own
/// copy of the configuration and its own token cache.
#[derive(Debug, Clone)]
pub struct Source {
    config: JwtConfig,
}

impl Source {
    /// Create a source from key data in JSON format.
    pub fn new(keydata: &[u8], scopes: &[&str]) -> Result<Self, Error> {
        Ok(Self {
            config: JwtConfig::from_json(keydata, scopes)?,
        })
    }

    /// Create a source from a key file containing JSON key data.
    pub fn from_keyfile(keyfile: impl AsRef<Path>, scopes: &[&str]) -> Result<Self, Error> {
        Ok(Self {
            config: JwtConfig::from_keyfile(keyfile, scopes)?,
        })
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// A new client acting as the service account itself.
    pub fn client(&self) -> Result<AuthenticatedClient, Error> {
        self.config.client()
    }

    /// A new client that impersonates `subject`. The source is left unchanged.
    pub fn client_with_subject(&self, subject: &str) -> Result<AuthenticatedClient, Error> {
        self.config.with_subject(subject).client()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigErrorKind, ErrorKind};
    use mockito::Server;
    use std::io::Write;

    const KEY_JSON: &str = include_str!("../testdata/service_account.json");
    const SCOPE: &str = "https://www.googleapis.com/auth/contacts.readonly";

    fn key_json_for(token_uri: &str) -> String {
        let mut value: serde_json::Value = serde_json::from_str(KEY_JSON).unwrap();
        value["token_uri"] = serde_json::json!(token_uri);
        value.to_string()
    }

    #[test]
    fn test_new_source() {
        let source = Source::new(KEY_JSON.as_bytes(), &[SCOPE]).unwrap();
        assert_eq!(source.config().scopes(), &[SCOPE.to_string()]);
    }

    #[test]
    fn test_source_from_keyfile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEY_JSON.as_bytes()).unwrap();
        assert!(Source::from_keyfile(file.path(), &[SCOPE]).is_ok());
    }

    #[test]
    fn test_source_from_empty_keyfile_path() {
        let err = Source::from_keyfile("", &[SCOPE]).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::MissingKeyfile)
        );
    }

    #[tokio::test]
    async fn test_clients_with_subject_are_independent() {
        let mut server = Server::new_async().await;
        let token_uri = format!("{}/token", server.url());

        let mut token_mocks = Vec::new();
        for subject in ["alice@example.com", "bob@example.com"] {
            let expected = subject.to_string();
            let body = format!(
                r#"{{"access_token":"token-{}","token_type":"Bearer","expires_in":3600}}"#,
                subject
            );
            token_mocks.push(
                server
                    .mock("POST", "/token")
                    .match_request(move |request| {
                        let body = request.body().unwrap();
                        let assertion = url::form_urlencoded::parse(body)
                            .find(|(k, _)| k == "assertion")
                            .map(|(_, v)| v.into_owned())
                            .unwrap_or_default();
                        assertion
                            .split('.')
                            .nth(1)
                            .and_then(|p| {
                                use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
                                URL_SAFE_NO_PAD.decode(p).ok()
                            })
                            .and_then(|b| serde_json::from_slice::<serde_json::Value>(&b).ok())
                            .map(|claims| claims["sub"] == expected.as_str())
                            .unwrap_or(false)
                    })
                    .with_status(200)
                    .with_body(body)
                    .expect(1)
                    .create_async()
                    .await,
            );
        }

        let alice_api = server
            .mock("GET", "/whoami")
            .match_header("authorization", "Bearer token-alice@example.com")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let bob_api = server
            .mock("GET", "/whoami")
            .match_header("authorization", "Bearer token-bob@example.com")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let source = Source::new(key_json_for(&token_uri).as_bytes(), &[SCOPE]).unwrap();
        let alice = source.client_with_subject("alice@example.com").unwrap();
        let bob = source.client_with_subject("bob@example.com").unwrap();
        assert_eq!(source.config().subject(), None);

        let url = format!("{}/whoami", server.url());
        alice.get(&url).send().await.unwrap();
        bob.get(&url).send().await.unwrap();

        for mock in &token_mocks {
            mock.assert_async().await;
        }
        alice_api.assert_async().await;
        bob_api.assert_async().await;
    }
}
