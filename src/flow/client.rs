use crate::flow::challenge::Challenge;
use crate::flow::error::FlowError;
use crate::flow::form::Submission;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// A flow slug as accepted by the executor endpoint
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9_-]+$").is_ok_and(|regex| regex.is_match(slug))
}

/// HTTP client for the executor endpoint.
///
/// The protocol is session-cookie-based: the server tracks flow state in the
/// session, so the client keeps a cookie jar across requests.
#[derive(Debug, Clone)]
pub struct FlowClient {
    http: Client,
    base: Url,
}

#[derive(Debug, Clone)]
pub struct FlowClientBuilder {
    base: String,
    timeout: Duration,
    accept_invalid_certs: bool,
    jar: Option<Arc<reqwest::cookie::Jar>>,
}

impl FlowClientBuilder {
    fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
            jar: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Lab escape hatch, off by default
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Share a cookie jar with the embedding application
    #[must_use]
    pub fn cookie_jar(mut self, jar: Arc<reqwest::cookie::Jar>) -> Self {
        self.jar = Some(jar);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the base URL does not parse, uses a scheme other
    /// than http or https, or the HTTP client cannot be constructed
    pub fn build(self) -> Result<FlowClient, FlowError> {
        let base = Url::parse(&self.base)?;

        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(FlowError::UnsupportedScheme(scheme.to_string())),
        }

        let mut builder = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(self.timeout);

        builder = match self.jar {
            Some(jar) => builder.cookie_provider(jar),
            None => builder.cookie_store(true),
        };

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(FlowClient {
            http: builder.build()?,
            base,
        })
    }
}

impl FlowClient {
    pub fn builder(base: impl Into<String>) -> FlowClientBuilder {
        FlowClientBuilder::new(base)
    }

    /// Client with default options
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable
    pub fn new(base: impl Into<String>) -> Result<Self, FlowError> {
        Self::builder(base).build()
    }

    /// URL of the executor endpoint for a flow.
    ///
    /// The original query string rides along as the `query` parameter; the
    /// server unpacks it to pick up `next` and `flow_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slug contains characters outside
    /// `[a-zA-Z0-9_-]`
    pub fn executor_url(&self, slug: &str, query: Option<&str>) -> Result<Url, FlowError> {
        if !is_valid_slug(slug) {
            return Err(FlowError::InvalidSlug(slug.to_string()));
        }

        let mut url = self.base.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v3", "flows", "executor", slug, ""]);
        }

        if let Some(query) = query {
            if !query.is_empty() {
                url.query_pairs_mut().append_pair("query", query);
            }
        }

        Ok(url)
    }

    /// Fetch the current challenge of a flow
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a
    /// challenge
    #[instrument(skip(self))]
    pub async fn get_challenge(
        &self,
        slug: &str,
        query: Option<&str>,
    ) -> Result<Challenge, FlowError> {
        let url = self.executor_url(slug, query)?;

        debug!("fetching challenge from {url}");

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        Self::challenge_from(&url, response).await
    }

    /// Submit a stage response and receive the next challenge
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a
    /// challenge
    #[instrument(skip(self, submission))]
    pub async fn solve(
        &self,
        slug: &str,
        query: Option<&str>,
        submission: &Submission,
    ) -> Result<Challenge, FlowError> {
        let url = self.executor_url(slug, query)?;

        debug!("submitting stage response to {url}");

        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(submission)
            .send()
            .await?;

        Self::challenge_from(&url, response).await
    }

    // Validation failures come back as a challenge with response_errors and
    // status 400, so 400 bodies are challenges too.
    async fn challenge_from(url: &Url, response: reqwest::Response) -> Result<Challenge, FlowError> {
        let status = response.status();

        if status.is_success() || status == StatusCode::BAD_REQUEST {
            let body = response.text().await?;
            let challenge: Challenge = serde_json::from_str(&body)?;

            debug!(component = %challenge.component, "received challenge");

            return Ok(challenge);
        }

        let body = response.text().await.unwrap_or_default();

        Err(FlowError::Endpoint {
            url: url.to_string(),
            status,
            body,
        })
    }
}
