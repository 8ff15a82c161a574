//! Response types of the contact feed, mirroring the GData JSON format.
//!
//! GData wraps most scalar values in text nodes of the form `{"$t": "..."}`.
//! Those wrappers are kept as small named structs so the wire shape stays
//! visible in the types.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

/// HTTP status and headers of the response a value was decoded from.
#[derive(Debug, Clone, Default)]
pub struct ServerResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Response to a contact feed request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFeedResponse {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub feed: ContactFeed,

    /// Not part of the JSON body; filled in from the HTTP response.
    #[serde(skip)]
    pub server_response: ServerResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFeed {
    #[serde(default)]
    pub id: IdField,
    #[serde(default)]
    pub updated: UpdatedField,
    #[serde(rename = "entry", default)]
    pub contacts: Vec<Contact>,
}

/// An entity such as a person, venue or organization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Contact {
    #[serde(default)]
    pub id: IdField,
    #[serde(default)]
    pub updated: UpdatedField,
    #[serde(default)]
    pub title: TitleField,
    #[serde(rename = "gd$organization", default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<Organization>,
    #[serde(rename = "gd$email", default, skip_serializing_if = "Vec::is_empty")]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(rename = "gd$phoneNumber", default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<PhoneNumber>,
}

impl Contact {
    /// The primary email address, falling back to the first one listed.
    pub fn primary_email(&self) -> Option<&EmailAddress> {
        self.email_addresses
            .iter()
            .find(|e| e.primary)
            .or_else(|| self.email_addresses.first())
    }
}

/// An organization a contact is affiliated with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Organization {
    #[serde(rename = "gd$orgName", default)]
    pub name: NameField,
    #[serde(rename = "gd$orgTitle", default)]
    pub title: TitleField,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EmailAddress {
    #[serde(rename = "address", default)]
    pub value: String,
    #[serde(rename = "displayName", default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    // GData sends booleans as the strings "true" and "false".
    #[serde(
        default,
        deserialize_with = "bool_from_string",
        serialize_with = "bool_to_string"
    )]
    pub primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PhoneNumber {
    #[serde(rename = "$t", default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IdField {
    #[serde(rename = "$t", default)]
    pub id: String,
}

/// Update timestamp, ISO 8601 as sent by the server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdatedField {
    #[serde(rename = "$t", default)]
    pub updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TitleField {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(rename = "$t", default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NameField {
    #[serde(rename = "$t", default)]
    pub name: String,
}

fn bool_from_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Text(String),
        Bool(bool),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => text.parse::<bool>().map_err(serde::de::Error::custom),
    }
}

fn bool_to_string<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(if *value { "true" } else { "false" })
}
