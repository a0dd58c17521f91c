//! Error types for PostgREST operations.

use serde::Deserialize;

/// Result type alias for PostgREST operations.
pub type Result<T> = std::result::Result<T, Error>;

/// PostgREST error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reported by the REST gateway.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the gateway error body, or the raw body text.
        message: String,
    },

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Error body returned by the REST gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Gateway error code (e.g. `PGRST116`).
    #[serde(default)]
    pub code: String,
    /// Extra details.
    #[serde(default)]
    pub details: Option<String>,
    /// Hint for resolving the error.
    #[serde(default)]
    pub hint: Option<String>,
}

impl ErrorBody {
    /// Converts to an Error, preserving the HTTP status.
    #[must_use]
    pub fn into_error(self, status: u16) -> Error {
        let message = if self.message.is_empty() {
            self.code
        } else {
            self.message
        };
        Error::Api { status, message }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_decode() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"message":"duplicate key value","code":"23505","details":null,"hint":null}"#,
        )
        .unwrap();
        assert_eq!(body.message, "duplicate key value");
        assert_eq!(body.code, "23505");
    }

    #[test]
    fn test_error_body_into_error() {
        let body = ErrorBody {
            message: "row not found".to_string(),
            code: "PGRST116".to_string(),
            details: None,
            hint: None,
        };
        let err = body.into_error(406);
        assert_eq!(
            err.to_string(),
            "API error (406): row not found".to_string()
        );
    }

    #[test]
    fn test_error_body_falls_back_to_code() {
        let body = ErrorBody {
            message: String::new(),
            code: "PGRST301".to_string(),
            details: None,
            hint: None,
        };
        match body.into_error(401) {
            Error::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "PGRST301");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
