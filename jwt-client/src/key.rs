//! Service-account key files.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{config_error, ConfigErrorKind, Error};

/// Key `type` accepted by [`ServiceAccountKey::from_json`].
pub const SERVICE_ACCOUNT_KEY_TYPE: &str = "service_account";

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// A Google service-account key as downloaded from the Cloud console.
///
/// Only the fields needed for the JWT bearer grant are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: SecretString,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse key data in JSON format.
    pub fn from_json(keydata: &[u8]) -> Result<Self, Error> {
        let key: ServiceAccountKey = serde_json::from_slice(keydata).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::error::ErrorKind::Config(ConfigErrorKind::InvalidKey),
        })?;

        if key.key_type != SERVICE_ACCOUNT_KEY_TYPE {
            return Err(config_error(
                ConfigErrorKind::UnsupportedKeyType,
                &format!(
                    "'type' field is {:?} (expected {:?})",
                    key.key_type, SERVICE_ACCOUNT_KEY_TYPE
                ),
            ));
        }

        Ok(key)
    }

    /// Read and parse a key file.
    pub fn from_keyfile(keyfile: impl AsRef<Path>) -> Result<Self, Error> {
        let keyfile = keyfile.as_ref();
        if keyfile.as_os_str().is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingKeyfile,
                "no keyfile specified",
            ));
        }

        let data = std::fs::read(keyfile).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::error::ErrorKind::Config(ConfigErrorKind::UnreadableKeyfile),
        })?;

        Self::from_json(&data)
    }
}
