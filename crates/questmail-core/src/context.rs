//! Request contexts passed into the service layer.
//!
//! Contexts are built once after sign-in and handed to every operation
//! explicitly. A [`MailContext`] always carries a live session; a
//! [`ChatContext`] runs anonymously against the chat project and carries
//! identity only in row payloads.

use questmail_auth::{AuthUser, Session};
use questmail_postgrest::PostgrestClient;
use questmail_storage::StorageClient;

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::id::UserId;
use crate::mail::MAIL_DOMAIN;

/// Clients and identity for mail operations.
#[derive(Debug, Clone)]
pub struct MailContext {
    /// Table client for the mail project.
    pub db: PostgrestClient,
    /// Object storage client for the mail project.
    pub storage: StorageClient,
    /// The signed-in session.
    pub session: Session,
}

impl MailContext {
    /// Builds a mail context from project settings and a live session.
    ///
    /// # Errors
    ///
    /// Returns an error if the project URL does not parse.
    pub fn new(config: &ProjectConfig, session: Session) -> Result<Self> {
        Ok(Self {
            db: PostgrestClient::new(&config.url, &config.key)?,
            storage: StorageClient::new(&config.url, &config.key)?,
            session,
        })
    }

    /// Access token for authenticated calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.session.access_token
    }

    /// Id of the signed-in user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.session.user.id)
    }

    /// Email of the signed-in user.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.session.user.email
    }
}

/// Client and identity for chat operations.
///
/// The chat backend is a separate project; requests run under its
/// anonymous key and rows carry the user id from the mail session.
#[derive(Debug, Clone)]
pub struct ChatContext {
    /// Table client for the chat project.
    pub db: PostgrestClient,
    /// The signed-in user, taken from the mail session.
    pub user: AuthUser,
}

impl ChatContext {
    /// Builds a chat context from project settings and the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the project URL does not parse.
    pub fn new(config: &ProjectConfig, user: AuthUser) -> Result<Self> {
        Ok(Self {
            db: PostgrestClient::new(&config.url, &config.key)?,
            user,
        })
    }

    /// Id of the signed-in user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.user.id)
    }

    /// Chat display name: the account email with the questmail domain
    /// stripped, `Unknown` when nothing remains.
    #[must_use]
    pub fn username(&self) -> String {
        let name = self.user.email.replacen(MAIL_DOMAIN, "", 1);
        if name.is_empty() {
            "Unknown".to_string()
        } else {
            name
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chat_context(email: &str) -> ChatContext {
        let config = ProjectConfig {
            url: "https://chat.example.co".to_string(),
            key: "anon-key".to_string(),
        };
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        ChatContext::new(&config, user).unwrap()
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_username_strips_domain() {
            assert_eq!(chat_context("alice@questmail.com").username(), "alice");
        }

        #[test]
        fn test_username_keeps_foreign_domain() {
            assert_eq!(
                chat_context("bob@example.com").username(),
                "bob@example.com"
            );
        }

        #[test]
        fn test_username_falls_back_when_empty() {
            assert_eq!(chat_context("@questmail.com").username(), "Unknown");
        }
    }
}
