//! Mail domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AttachmentId, MailId, UserId};

/// Fixed address domain for every account.
pub const MAIL_DOMAIN: &str = "@questmail.com";

/// Hard per-file attachment limit (25 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 25 * 1024 * 1024;

/// Per-user storage quota across all attachments (100 MiB).
pub const STORAGE_QUOTA_BYTES: u64 = 100 * 1024 * 1024;

/// Builds the full address for a bare username.
#[must_use]
pub fn full_address(username: &str) -> String {
    format!("{username}{MAIL_DOMAIN}")
}

/// Rewrites the questmail domain for display: `alice@questmail.com` shows
/// as `alice?questmail.com`. Foreign domains pass through untouched.
#[must_use]
pub fn display_address(email: &str) -> String {
    email.replacen(MAIL_DOMAIN, "?questmail.com", 1)
}

/// Mail folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    /// Received mail.
    Inbox,
    /// Mail the user sent.
    Sent,
    /// Mail flagged as junk.
    Spam,
    /// Soft-deleted mail.
    Trash,
}

impl Folder {
    /// All folders in sidebar order.
    pub const ALL: [Self; 4] = [Self::Inbox, Self::Sent, Self::Spam, Self::Trash];

    /// Wire and display name of the folder.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
            Self::Spam => "spam",
            Self::Trash => "trash",
        }
    }

    /// Parses a folder name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "inbox" => Some(Self::Inbox),
            "sent" => Some(Self::Sent),
            "spam" => Some(Self::Spam),
            "trash" => Some(Self::Trash),
            _ => None,
        }
    }
}

impl std::fmt::Display for Folder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One mail row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mail {
    /// Row id.
    pub id: MailId,
    /// Sending user.
    pub sender: UserId,
    /// Receiving user.
    pub recipient: UserId,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Whether the body is HTML.
    pub html: bool,
    /// Whether the mail self-destructs when the reader closes it.
    pub onetime: bool,
    /// Folder the mail currently sits in.
    pub folder: Folder,
    /// Thread root id; absent when this mail is its own root.
    pub thread_id: Option<MailId>,
    /// Creation time, set by the platform.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has opened it.
    pub read: bool,
}

impl Mail {
    /// The thread root: the mail's thread id if present, else its own id.
    #[must_use]
    pub fn thread_root(&self) -> MailId {
        self.thread_id.unwrap_or(self.id)
    }
}

/// Payload for inserting a mail row.
///
/// The folder is set explicitly so the mail lands in the recipient's
/// inbox; id, timestamp and read state come from the platform.
#[derive(Debug, Clone, Serialize)]
pub struct NewMail {
    /// Sending user.
    pub sender: UserId,
    /// Receiving user.
    pub recipient: UserId,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Whether the body is HTML.
    pub html: bool,
    /// Whether the mail self-destructs when the reader closes it.
    pub onetime: bool,
    /// Folder to file the mail under.
    pub folder: Folder,
    /// Thread root id; `None` starts a new thread.
    pub thread_id: Option<MailId>,
}

/// One attachment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Row id.
    pub id: AttachmentId,
    /// Owning mail.
    pub mail_id: MailId,
    /// Public URL of the stored object.
    pub file_url: String,
    /// Object size in bytes.
    pub size_bytes: u64,
    /// Uploading user.
    pub uploader: UserId,
}

impl Attachment {
    /// File name, taken from the last URL segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_url
            .rsplit('/')
            .next()
            .unwrap_or(self.file_url.as_str())
    }
}

/// A mail with both addresses resolved for the list view.
#[derive(Debug, Clone)]
pub struct MailSummary {
    /// The mail row.
    pub mail: Mail,
    /// Resolved sender address.
    pub sender_email: String,
    /// Resolved recipient address.
    pub recipient_email: String,
}

impl MailSummary {
    /// Case-insensitive substring search over subject, body and both
    /// addresses; a match in any field counts.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.mail.subject.to_lowercase().contains(&q)
            || self.mail.body.to_lowercase().contains(&q)
            || self.sender_email.to_lowercase().contains(&q)
            || self.recipient_email.to_lowercase().contains(&q)
    }

    /// The counterpart address to show in a folder listing: the recipient
    /// in the sent folder, the sender everywhere else.
    #[must_use]
    pub fn counterpart(&self, folder: Folder) -> &str {
        if folder == Folder::Sent {
            &self.recipient_email
        } else {
            &self.sender_email
        }
    }
}

/// Storage usage against the per-user quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageUsage {
    /// Bytes used across the user's attachments.
    pub used_bytes: u64,
}

impl StorageUsage {
    /// Creates usage from a byte count.
    #[must_use]
    pub const fn new(used_bytes: u64) -> Self {
        Self { used_bytes }
    }

    /// Percentage of the quota used, clamped to `[0, 100]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(self) -> f64 {
        let pct = (self.used_bytes as f64 / STORAGE_QUOTA_BYTES as f64) * 100.0;
        pct.clamp(0.0, 100.0)
    }

    /// Coarse gauge label.
    #[must_use]
    pub fn label(self) -> &'static str {
        let pct = self.percent();
        if pct > 90.0 {
            "Storage almost full"
        } else if pct > 70.0 {
            "Storage getting full"
        } else {
            "Plenty of space left"
        }
    }

    /// Whether adding `extra` bytes would exceed the quota.
    #[must_use]
    pub const fn would_exceed(self, extra: u64) -> bool {
        self.used_bytes.saturating_add(extra) > STORAGE_QUOTA_BYTES
    }
}
