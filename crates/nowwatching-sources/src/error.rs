use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Failures talking to Trakt or the image catalog.
///
/// Timeouts surface as `Transport`; there is no separate variant for them.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    },

    #[error("client misconfigured: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

impl SourceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Transport(e) if e.is_timeout())
    }

    /// Response headers of a non-success reply, e.g. the rate limit header on a 429.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            SourceError::Status { headers, .. } => Some(headers),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            SourceError::Transport(e) => e.status(),
            _ => None,
        }
    }
}
