//! # questmail-core
//!
//! Core business logic for the `QuestMail` client.
//!
//! This crate provides:
//! - Session lifecycle (sign-in, sign-up, sign-out, change notifications)
//! - Mailbox listing with folder semantics and client-side search
//! - Compose and reply flows with attachment size/quota enforcement
//! - Thread resolution and one-time mail destruction
//! - Chat sessions fed by live message and presence subscriptions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod chat;
pub mod config;
pub mod context;
pub mod directory;
mod error;
pub mod id;
pub mod mail;
pub mod session;

pub use chat::{
    CHAT_HISTORY_LIMIT, ChatError, ChatFeeds, ChatMessage, ChatPhase, ChatResult, ChatSession,
    OnlineUser,
};
pub use config::{Config, ProjectConfig};
pub use context::{ChatContext, MailContext};
pub use directory::{DirectoryEntry, UNKNOWN_ADDRESS};
pub use error::{Error, Result};
pub use id::{AttachmentId, MailId, UserId};
pub use mail::{
    Attachment, AttachmentUpload, ComposeError, ComposeResult, Draft, Folder, MAIL_DOMAIN,
    MAX_ATTACHMENT_BYTES, Mail, MailSummary, STORAGE_QUOTA_BYTES, StorageUsage, Thread,
    ThreadMessage,
};
pub use session::SessionManager;
