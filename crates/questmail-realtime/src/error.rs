//! Error types for realtime operations.

/// Result type alias for realtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Realtime error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The project URL cannot be turned into a websocket URL.
    #[error("Invalid realtime URL: {0}")]
    InvalidUrl(String),

    /// The socket task has ended.
    #[error("Connection closed")]
    Closed,
}
