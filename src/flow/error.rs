use thiserror::Error;

/// Errors surfaced while talking to the flow executor endpoint or while
/// driving a flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The request never produced a usable HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with something that is not a challenge.
    #[error("{url} - {status}, {body}")]
    Endpoint {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body could not be decoded as a challenge.
    #[error("error decoding challenge: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL could not be parsed.
    #[error("error parsing URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// Only http and https endpoints are supported.
    #[error("error parsing URL: unsupported scheme {0}")]
    UnsupportedScheme(String),

    /// Flow slugs are restricted to letters, digits, hyphen and underscore.
    #[error("invalid flow slug: {0:?}")]
    InvalidSlug(String),

    /// `submit` was called before `start` fetched the first challenge.
    #[error("flow has not been started")]
    NotStarted,

    /// `start` was called twice.
    #[error("flow already started")]
    AlreadyStarted,

    /// A submission is already on the wire; overlapping submissions are
    /// rejected rather than queued.
    #[error("a submission is already in flight")]
    SubmitInFlight,

    /// The flow reached its terminal navigation; no further submissions
    /// are accepted.
    #[error("flow already redirected")]
    AlreadyRedirected,
}
