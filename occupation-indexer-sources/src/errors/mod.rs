//! Error types for the upstream data sources.

use thiserror::Error;

/// Errors that can occur while fetching upstream data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The bulk archive could not be fetched or held no readable spreadsheet.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The competency call sequence for one occupation failed.
    #[error("Profile fetch failed for {code}: {message}")]
    ProfileFetchFailed { code: String, message: String },

    /// The upstream answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The request never got a response (connect, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SourceError {
    /// Create a source unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create a profile fetch error.
    pub fn profile_fetch_failed(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ProfileFetchFailed {
            code: code.into(),
            message: msg.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, rate limiting (429) and server errors (5xx) are
    /// transient; everything else fails the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Transport(_) => true,
            SourceError::Http { status, .. } => *status == 429 || *status >= 500,
            SourceError::SourceUnavailable(_)
            | SourceError::ProfileFetchFailed { .. }
            | SourceError::Decode(_)
            | SourceError::InvalidRequest(_) => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if err.is_builder() {
            return Self::InvalidRequest(err.to_string());
        }
        Self::Transport(err.to_string())
    }
}
