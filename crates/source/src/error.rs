//! Error types for the CFTC source client.

use thiserror::Error;

/// Errors that can occur when talking to the CFTC Socrata API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// API request returned a non-success status.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error body from the API.
        message: String,
    },

    /// Request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Network-level failure (connect error, reset, DNS).
    #[error("network error: {0}")]
    Network(String),

    /// Retry budget exhausted on a transient failure.
    #[error("fetch failed after {attempts} attempts: {message}")]
    FetchFailed {
        /// Total attempts made, including the first.
        attempts: u32,
        /// Last underlying error.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl SourceError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns true if the request may succeed on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
