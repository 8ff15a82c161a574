//! The contact feed call builder.

use std::collections::BTreeMap;

use log::*;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, IF_NONE_MATCH, USER_AGENT};
use reqwest::StatusCode;
use url::Url;

use crate::context::CallContext;
use crate::error::{api_error, config_error, ApiError, ConfigErrorKind, Error};
use crate::service::Service;
use crate::types::{ContactFeedResponse, ServerResponse};
use crate::VERSION;

const GDATA_VERSION: HeaderName = HeaderName::from_static("gdata-version");

/// Standard parameters accepted by every Google API call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOption {
    /// Attribute quota to an arbitrary user string (`quotaUser`).
    QuotaUser(String),
    /// Attribute quota to an end user IP address (`userIp`).
    UserIp(String),
    /// Ask Google to trace the request with the given token (`trace`).
    Trace(String),
}

impl CallOption {
    fn apply(self, params: &mut BTreeMap<String, String>) {
        let (key, value) = match self {
            CallOption::QuotaUser(user) => ("quotaUser", user),
            CallOption::UserIp(ip) => ("userIp", ip),
            CallOption::Trace(token) => ("trace", format!("token:{}", token)),
        };
        params.insert(key.to_string(), value);
    }
}

/// A request for one page of a user's contact feed.
///
/// Built through [`ContactsService::feed`](crate::ContactsService::feed) and
/// consumed by [`send`](Self::send).
#[derive(Debug)]
pub struct ContactFeedCall {
    service: Service,
    user_id: String,
    projection: String,
    url_params: BTreeMap<String, String>,
    if_none_match: Option<String>,
    context: Option<CallContext>,
    headers: HeaderMap,
}

impl ContactFeedCall {
    pub(crate) fn new(service: Service, user_id: String, projection: String) -> Self {
        Self {
            service,
            user_id,
            projection,
            url_params: BTreeMap::new(),
            if_none_match: None,
            context: None,
            headers: HeaderMap::new(),
        }
    }

    /// Full text query on contacts.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.url_params.insert("q".to_string(), query.into());
        self
    }

    /// Only return contacts belonging to the group with this id.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.url_params.insert("group".to_string(), group.into());
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.url_params
            .insert("max-results".to_string(), max_results.to_string());
        self
    }

    /// Bind the call to a cancellation token and/or deadline.
    pub fn context(mut self, context: CallContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Add an HTTP header to the request.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Headers sent with the request, for adding several at once.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Only return the feed if its ETag differs from `etag`; otherwise the
    /// call fails with a `NotModified` API error.
    pub fn if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.if_none_match = Some(etag.into());
        self
    }

    pub fn option(mut self, option: CallOption) -> Self {
        option.apply(&mut self.url_params);
        self
    }

    /// Execute the call.
    ///
    /// Any non-2xx status is returned as an `ErrorKind::Api` error. Use
    /// [`Error::is_not_modified`] to check for a 304 answer to
    /// [`if_none_match`](Self::if_none_match).
    pub async fn send(self) -> Result<ContactFeedResponse, Error> {
        let context = self.context.clone().unwrap_or_default();
        context.run(self.execute()).await?
    }

    async fn execute(self) -> Result<ContactFeedResponse, Error> {
        let url = self.url()?;
        let headers = self.request_headers()?;

        debug!("Fetching contact feed: GET {}", url);
        let response = self
            .service
            .client()
            .get(url)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();

        if status == StatusCode::NOT_MODIFIED {
            debug!("Contact feed for {} not modified", self.user_id);
            return Err(api_error(ApiError::from_response(
                status,
                headers,
                String::new(),
            )));
        }

        let body = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(
                "Contact feed request for {} failed with status {}: {}",
                self.user_id, status, body
            );
            return Err(api_error(ApiError::from_response(status, headers, body)));
        }

        let mut feed: ContactFeedResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!("Failed to decode contact feed response: {:?}", e);
            Error::from(e)
        })?;
        feed.server_response = ServerResponse { status, headers };

        debug!(
            "Fetched {} contacts for {}",
            feed.feed.contacts.len(),
            self.user_id
        );
        Ok(feed)
    }

    /// Expands `contacts/{userID}/{projection}` below the base path.
    ///
    /// `/` inside a parameter separates segments; everything else a segment
    /// cannot hold literally (`?`, `#`, `%`, spaces) is percent-encoded, while
    /// `@` and `+` pass through.
    fn url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(self.service.base_path()).map_err(|e| {
            warn!("Invalid base path {}: {:?}", self.service.base_path(), e);
            config_error(ConfigErrorKind::InvalidUrl, &e.to_string())
        })?;

        let segments: Vec<&str> = std::iter::once("contacts")
            .chain(self.user_id.split('/'))
            .chain(self.projection.split('/'))
            .collect();
        // Dot segments would be resolved away and retarget the request.
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(config_error(
                ConfigErrorKind::InvalidUrl,
                &format!("path parameter contains dot segment {:?}", dot),
            ));
        }

        url.path_segments_mut()
            .map_err(|_| {
                config_error(
                    ConfigErrorKind::InvalidUrl,
                    &format!("base path {} cannot have a path", self.service.base_path()),
                )
            })?
            .pop_if_empty()
            .extend(segments);

        let mut params = self.url_params.clone();
        params.insert("alt".to_string(), "json".to_string());
        url.query_pairs_mut().clear().extend_pairs(params.iter());

        Ok(url)
    }

    fn request_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = self.headers.clone();

        if let Some(etag) = &self.if_none_match {
            let value = HeaderValue::from_str(etag)
                .map_err(|e| config_error(ConfigErrorKind::InvalidHeader, &e.to_string()))?;
            headers.insert(IF_NONE_MATCH, value);
        }

        let user_agent = HeaderValue::from_str(&self.service.user_agent())
            .map_err(|e| config_error(ConfigErrorKind::InvalidHeader, &e.to_string()))?;
        headers.insert(USER_AGENT, user_agent);
        headers.insert(GDATA_VERSION, HeaderValue::from_static(VERSION));

        Ok(headers)
    }
}
