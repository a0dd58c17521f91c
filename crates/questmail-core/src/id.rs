//! Typed identifiers shared across the domain.
//!
//! Mail-side rows are keyed by UUIDs minted by the platform; wrapping them
//! keeps a sender id from being handed to a query expecting a mail id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Creates a new user ID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a mail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailId(pub Uuid);

impl MailId {
    /// Creates a new mail ID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MailId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an attachment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub Uuid);

impl AttachmentId {
    /// Creates a new attachment ID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod id_tests {
        use super::*;

        #[test]
        fn test_user_id_serializes_as_bare_uuid() {
            let id = UserId::new(Uuid::nil());
            let value = serde_json::to_value(id).unwrap();
            assert_eq!(
                value,
                serde_json::json!("00000000-0000-0000-0000-000000000000")
            );
        }

        #[test]
        fn test_mail_id_round_trips() {
            let id = MailId::new(Uuid::new_v4());
            let json = serde_json::to_string(&id).unwrap();
            let back: MailId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, id);
        }

        #[test]
        fn test_display_matches_inner_uuid() {
            let raw = Uuid::new_v4();
            assert_eq!(UserId::new(raw).to_string(), raw.to_string());
            assert_eq!(AttachmentId::new(raw).to_string(), raw.to_string());
        }
    }
}
