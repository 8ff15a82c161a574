//! Service root and resource sub-services.

use std::fmt;
use std::sync::Arc;

use crate::call::ContactFeedCall;
use crate::BASE_PATH;

/// HTTP client the service sends requests through. Authentication, if any,
/// is the client's business (see the `jwt-client` crate).
pub type HttpClient = reqwest_middleware::ClientWithMiddleware;

/// User agent sent with every request, before any caller supplied suffix.
pub const USER_AGENT: &str = concat!("contacts-rs/", env!("CARGO_PKG_VERSION"));

/// Root of the Contacts API.
///
/// Cloning is cheap and clones share the underlying HTTP client, so one
/// service can be handed to many tasks.
#[derive(Clone)]
pub struct Service {
    inner: Arc<Inner>,
}

#[derive(Clone)]
struct Inner {
    client: HttpClient,
    base_path: String,
    user_agent: Option<String>,
}

impl Service {
    /// Create a service that sends requests through `client`.
    pub fn new(client: impl Into<HttpClient>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client: client.into(),
                base_path: BASE_PATH.to_string(),
                user_agent: None,
            }),
        }
    }

    /// Point the service at a different endpoint, e.g. a test server.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        Arc::make_mut(&mut self.inner).base_path = base_path;
        self
    }

    /// Append `user_agent` to the library's own User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.set_user_agent(user_agent);
        self
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        let user_agent = user_agent.into();
        Arc::make_mut(&mut self.inner).user_agent = Some(user_agent).filter(|ua| !ua.is_empty());
    }

    pub fn base_path(&self) -> &str {
        &self.inner.base_path
    }

    /// Full User-Agent header value.
    pub fn user_agent(&self) -> String {
        match &self.inner.user_agent {
            Some(suffix) => format!("{} {}", USER_AGENT, suffix),
            None => USER_AGENT.to_string(),
        }
    }

    /// Access to contact feeds.
    pub fn contacts(&self) -> ContactsService {
        ContactsService {
            service: self.clone(),
        }
    }

    pub(crate) fn client(&self) -> &HttpClient {
        &self.inner.client
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("base_path", &self.inner.base_path)
            .field("user_agent", &self.inner.user_agent)
            .finish_non_exhaustive()
    }
}

/// Contact feed operations.
#[derive(Debug, Clone)]
pub struct ContactsService {
    service: Service,
}

impl ContactsService {
    /// Start a call for the contact feed of `user_id` (an email address or
    /// `"default"`) at the given projection (`"full"`, `"thin"`, ...).
    pub fn feed(&self, user_id: impl Into<String>, projection: impl Into<String>) -> ContactFeedCall {
        ContactFeedCall::new(self.service.clone(), user_id.into(), projection.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let service = Service::new(reqwest::Client::new());
        assert_eq!(service.base_path(), BASE_PATH);
        assert_eq!(service.user_agent(), USER_AGENT);
    }

    #[test]
    fn test_user_agent_suffix() {
        let mut service = Service::new(reqwest::Client::new()).with_user_agent("sync-job/2.1");
        assert_eq!(service.user_agent(), format!("{} sync-job/2.1", USER_AGENT));

        service.set_user_agent("");
        assert_eq!(service.user_agent(), USER_AGENT);
    }

    #[test]
    fn test_user_agent_change_does_not_leak_into_clones() {
        let original = Service::new(reqwest::Client::new());
        let mut tagged = original.clone();
        tagged.set_user_agent("tagged");

        assert_eq!(original.user_agent(), USER_AGENT);
        assert!(tagged.user_agent().ends_with(" tagged"));
    }

    #[test]
    fn test_base_path_gets_trailing_slash() {
        let service = Service::new(reqwest::Client::new()).with_base_path("http://127.0.0.1:1234/m8/feeds");
        assert_eq!(service.base_path(), "http://127.0.0.1:1234/m8/feeds/");
    }
}
