//! Chat domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::UserId;

/// Upper bound on messages kept in memory; the oldest are evicted first.
pub const CHAT_HISTORY_LIMIT: usize = 50;

/// User-facing chat failures. Display strings are shown verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The history snapshot failed.
    #[error("Failed to load messages")]
    LoadMessages,
    /// A message insert failed.
    #[error("Failed to send message")]
    SendMessage,
}

/// Result type for chat operations.
pub type ChatResult<T> = std::result::Result<T, ChatError>;

/// One chat message row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Row id.
    pub id: i64,
    /// Sending user.
    pub user_id: UserId,
    /// Display name recorded at send time.
    pub username: String,
    /// Sender email recorded at send time.
    pub email: String,
    /// Message text.
    pub message: String,
    /// Creation time, set by the platform.
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a chat message; id and timestamp come from the
/// platform.
#[derive(Debug, Clone, Serialize)]
pub struct NewChatMessage {
    /// Sending user.
    pub user_id: UserId,
    /// Display name to record.
    pub username: String,
    /// Sender email to record.
    pub email: String,
    /// Message text.
    pub message: String,
}

/// One presence row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUser {
    /// Row id.
    pub id: i64,
    /// The user this row tracks; unique per user.
    pub user_id: UserId,
    /// Display name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Last presence write.
    pub last_seen: DateTime<Utc>,
    /// Online flag. Rows are deleted on exit rather than flipped, so a
    /// surviving row always reads true; a stale one means the cleanup
    /// never ran.
    pub is_online: bool,
}
