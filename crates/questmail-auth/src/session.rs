//! Session and user types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// The authenticated user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable user identifier.
    pub id: Uuid,
    /// Account email address.
    pub email: String,
}

/// An authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer access token.
    pub access_token: String,
    /// Token type (usually "bearer").
    pub token_type: String,
    /// Expiration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token, when the service issued one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// The user this session belongs to.
    pub user: AuthUser,
}

impl Session {
    /// Creates a session from the service response.
    #[must_use]
    pub fn from_response(response: SessionResponse) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(i64::from(secs)));

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
            refresh_token: response.refresh_token,
            user: response.user,
        }
    }

    /// Checks if the session is expired (with 60 second buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| Utc::now() + Duration::seconds(60) >= exp)
    }

    /// Returns true if the session is valid (not expired).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    /// The id of the session's user.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user.id
    }
}

/// Session response from the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    pub token_type: String,
    /// Expires in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
    /// Refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// The authenticated user.
    pub user: AuthUser,
}

/// Error response from the auth service.
///
/// The service answers with two shapes depending on the endpoint: an
/// OAuth-style `{error, error_description}` pair or a `{code, msg}` pair.
/// Both decode here.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// OAuth-style error code.
    pub error: Option<String>,
    /// OAuth-style description.
    pub error_description: Option<String>,
    /// Service-style message.
    pub msg: Option<String>,
}

impl ErrorResponse {
    /// Converts to an Error, preserving the HTTP status.
    #[must_use]
    pub fn into_error(self, status: u16) -> Error {
        let message = self
            .msg
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| "unknown error".to_string());
        Error::Api { status, message }
    }
}
