//! Thin client for the provider's paginated list endpoints.

pub mod pagination;
pub mod search;

pub use pagination::{ListQuery, Page, Pagination};
pub use search::{EndpointFetcher, ObjectFetcher, SearchSelect};

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors surfaced by list fetching and selection
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable HTTP response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("{url} - {status}, {body}")]
    Endpoint {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body could not be decoded
    #[error("error decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL could not be parsed
    #[error("error parsing URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// Only http and https endpoints are supported
    #[error("error parsing URL: unsupported scheme {0}")]
    UnsupportedScheme(String),

    /// The collection was asked for a value before any objects were fetched
    #[error("objects are not loaded yet")]
    NotLoaded,

    /// Nothing is selected and the selection may not be blank
    #[error("nothing is selected")]
    NothingSelected,
}

/// Client for `/api/v3/` list endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse, uses a scheme other
    /// than http or https, or the HTTP client cannot be constructed
    pub fn new(base: impl Into<String>) -> Result<Self, ApiError> {
        let base = Url::parse(&base.into())?;

        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(ApiError::UnsupportedScheme(scheme.to_string())),
        }

        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base })
    }

    /// URL of a list endpoint, e.g. `core/applications`
    #[must_use]
    pub fn endpoint_url(&self, path: &str, query: &ListQuery) -> Url {
        let mut url = self.base.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v3"])
                .extend(path.split('/').filter(|segment| !segment.is_empty()))
                .push("");
        }

        query.apply(&mut url);

        url
    }

    /// Fetch one page of a collection
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a page
    #[instrument(skip(self, query))]
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, ApiError> {
        let url = self.endpoint_url(path, query);

        debug!("listing {url}");

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(ApiError::Endpoint {
                url: url.to_string(),
                status,
                body,
            });
        }

        let body = response.text().await?;
        let page = serde_json::from_str(&body)?;

        Ok(page)
    }
}
