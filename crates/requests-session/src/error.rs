//! Error types for request building and dispatch.

use crate::config::ConfigError;
use crate::request::Request;

/// HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("malformed URL {url:?}: {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header {name:?}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("failed to encode JSON body: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("{} {} timed out", .request.method(), .request.url())]
    Timeout {
        #[source]
        source: reqwest::Error,
        request: Box<Request>,
    },

    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
        request: Box<Request>,
    },

    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("response body lost to an earlier read failure: {0}")]
    BodyLost(String),

    #[error("failed to decode JSON body (status {status}): {source}")]
    Decode {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render YAML: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("server error: {status}")]
    ServerError { status: u16, body: String },

    #[error("client error: {status}")]
    ClientError { status: u16, body: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HttpError {
    /// Classify a failed dispatch, keeping the request that was attempted.
    pub(crate) fn dispatch(source: reqwest::Error, request: Request) -> Self {
        let request = Box::new(request);
        if source.is_timeout() {
            HttpError::Timeout { source, request }
        } else {
            HttpError::Transport { source, request }
        }
    }

    /// The request that was attempted, for errors raised during dispatch.
    pub fn request(&self) -> Option<&Request> {
        match self {
            HttpError::Timeout { request, .. } | HttpError::Transport { request, .. } => {
                Some(request)
            }
            _ => None,
        }
    }

    /// Whether this error came from the network rather than from building the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Timeout { .. } | HttpError::Transport { .. })
    }
}
