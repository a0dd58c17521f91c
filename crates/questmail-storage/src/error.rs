//! Error types for storage operations.

use serde::Deserialize;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Storage error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by the storage service.
    #[error("Storage error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the error body.
        message: String,
    },

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Error body returned by the storage service.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Status code echoed in the body.
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<String>,
    /// Short error name.
    #[serde(default)]
    pub error: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl ErrorBody {
    /// Converts to an Error, preserving the HTTP status.
    #[must_use]
    pub fn into_error(self, status: u16) -> Error {
        let message = if self.message.is_empty() {
            self.error
        } else {
            self.message
        };
        Error::Api { status, message }
    }
}
