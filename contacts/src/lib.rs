//! Client for the Google Contacts v3 feed API.
//!
//! ```no_run
//! # async fn run(client: reqwest_middleware::ClientWithMiddleware) -> Result<(), contacts::Error> {
//! let service = contacts::Service::new(client);
//! let response = service
//!     .contacts()
//!     .feed("default", "full")
//!     .query("lambert")
//!     .max_results(50)
//!     .send()
//!     .await?;
//!
//! for contact in &response.feed.contacts {
//!     println!("{}", contact.title.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Authentication is not handled here. Pass in a client that authorizes its
//! requests, such as one built by the `jwt-client` crate.

mod call;
mod context;
pub mod error;
mod service;
mod types;

pub use call::{CallOption, ContactFeedCall};
pub use context::CallContext;
pub use error::{ApiError, Error, ErrorKind};
pub use service::{ContactsService, HttpClient, Service, USER_AGENT};
pub use types::{
    Contact, ContactFeed, ContactFeedResponse, EmailAddress, IdField, NameField, Organization,
    PhoneNumber, ServerResponse, TitleField, UpdatedField,
};

/// API version, sent as the `GData-Version` header.
pub const VERSION: &str = "3.0";

pub const BASE_PATH: &str = "https://www.google.com/m8/feeds/";

/// Manage your contacts.
pub const CONTACTS_SCOPE: &str = "https://www.googleapis.com/auth/contacts";

/// View your contacts.
pub const CONTACTS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/contacts.readonly";
