//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Auth service call failed.
    #[error("Auth error: {0}")]
    Auth(#[from] questmail_auth::Error),

    /// Table query failed.
    #[error("Database error: {0}")]
    Database(#[from] questmail_postgrest::Error),

    /// Object storage call failed.
    #[error("Storage error: {0}")]
    Storage(#[from] questmail_storage::Error),

    /// Real-time subscription failed.
    #[error("Realtime error: {0}")]
    Realtime(#[from] questmail_realtime::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// No signed-in session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_not_authenticated_display() {
            assert_eq!(Error::NotAuthenticated.to_string(), "Not authenticated");
        }

        #[test]
        fn test_config_display() {
            let err = Error::Config("QUESTMAIL_MAIL_URL is not set".to_string());
            assert_eq!(
                err.to_string(),
                "Configuration error: QUESTMAIL_MAIL_URL is not set"
            );
        }

        #[test]
        fn test_database_error_wraps() {
            let inner = questmail_postgrest::Error::Api {
                status: 403,
                message: "permission denied".to_string(),
            };
            let err = Error::from(inner);
            assert!(err.to_string().starts_with("Database error:"));
        }
    }
}
