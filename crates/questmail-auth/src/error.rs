//! Error types for auth operations.

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Auth error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reported by the auth service.
    #[error("Auth error ({status}): {message}")]
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
