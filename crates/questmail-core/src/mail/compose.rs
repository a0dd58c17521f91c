//! Compose and reply validation.
//!
//! Attachment checks run in a fixed order: every file against the
//! per-file limit first, then the batch against the remaining quota.
//! Both pass before any row is inserted or any byte is uploaded.

use bytes::Bytes;
use thiserror::Error;

use crate::mail::model::{MAX_ATTACHMENT_BYTES, StorageUsage, full_address};

/// User-facing compose and reply failures.
///
/// Display strings are shown verbatim in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// The recipient username does not resolve to an account.
    #[error("Recipient not found")]
    RecipientNotFound,
    /// One file is over the per-file limit.
    #[error("File {0} exceeds 25MB limit.")]
    FileTooLarge(String),
    /// The batch would push the user past the storage quota.
    #[error("Total storage usage exceeds 100MB. Delete some attachments.")]
    QuotaExceeded,
    /// The mail row could not be created.
    #[error("Failed to send mail.")]
    SendFailed,
    /// The reply row could not be created.
    #[error("Failed to send reply.")]
    ReplyFailed,
    /// A file upload failed.
    #[error("Failed to upload {0}")]
    UploadFailed(String),
}

/// Result type for compose and reply operations.
pub type ComposeResult<T> = std::result::Result<T, ComposeError>;

/// One file staged for upload.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// File name, used as the last segment of the storage path.
    pub file_name: String,
    /// File contents.
    pub bytes: Bytes,
}

impl AttachmentUpload {
    /// Stages a file for upload.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A mail being written.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    /// Bare recipient username; the domain is appended on send.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Send the body as HTML.
    pub html: bool,
    /// Self-destruct when the reader closes it.
    pub onetime: bool,
    /// Files to attach.
    pub attachments: Vec<AttachmentUpload>,
}

impl Draft {
    /// Starts a draft addressed to a bare username.
    #[must_use]
    pub fn to(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            ..Self::default()
        }
    }

    /// Sets the subject line.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Marks the body as HTML.
    #[must_use]
    pub const fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    /// Marks the mail one-time read.
    #[must_use]
    pub const fn with_onetime(mut self, onetime: bool) -> Self {
        self.onetime = onetime;
        self
    }

    /// Stages a file on the draft.
    #[must_use]
    pub fn with_attachment(mut self, attachment: AttachmentUpload) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Full recipient address with the domain appended.
    #[must_use]
    pub fn recipient_address(&self) -> String {
        full_address(&self.recipient)
    }

    /// Total size of the staged files.
    #[must_use]
    pub fn attachments_size(&self) -> u64 {
        self.attachments.iter().map(AttachmentUpload::size).sum()
    }
}

/// Checks every file against the per-file limit.
///
/// # Errors
///
/// Returns [`ComposeError::FileTooLarge`] naming the first oversized file.
pub fn validate_file_sizes(files: &[AttachmentUpload]) -> ComposeResult<()> {
    for file in files {
        if file.size() > MAX_ATTACHMENT_BYTES {
            return Err(ComposeError::FileTooLarge(file.file_name.clone()));
        }
    }
    Ok(())
}

/// Checks the batch against the remaining quota.
///
/// # Errors
///
/// Returns [`ComposeError::QuotaExceeded`] when current usage plus the
/// batch would pass the quota.
pub fn validate_quota(files: &[AttachmentUpload], usage: StorageUsage) -> ComposeResult<()> {
    let total: u64 = files.iter().map(AttachmentUpload::size).sum();
    if usage.would_exceed(total) {
        return Err(ComposeError::QuotaExceeded);
    }
    Ok(())
}

/// Runs both attachment checks, per-file limit first.
///
/// # Errors
///
/// Returns the first failing check's error.
pub fn validate_attachments(files: &[AttachmentUpload], usage: StorageUsage) -> ComposeResult<()> {
    validate_file_sizes(files)?;
    validate_quota(files, usage)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mail::model::STORAGE_QUOTA_BYTES;

    fn file_of(name: &str, size: usize) -> AttachmentUpload {
        AttachmentUpload::new(name, Bytes::from(vec![0u8; size]))
    }

    mod error_message_tests {
        use super::*;

        #[test]
        fn test_display_strings_are_verbatim() {
            assert_eq!(
                ComposeError::RecipientNotFound.to_string(),
                "Recipient not found"
            );
            assert_eq!(
                ComposeError::FileTooLarge("video.mp4".to_string()).to_string(),
                "File video.mp4 exceeds 25MB limit."
            );
            assert_eq!(
                ComposeError::QuotaExceeded.to_string(),
                "Total storage usage exceeds 100MB. Delete some attachments."
            );
            assert_eq!(ComposeError::SendFailed.to_string(), "Failed to send mail.");
            assert_eq!(
                ComposeError::ReplyFailed.to_string(),
                "Failed to send reply."
            );
            assert_eq!(
                ComposeError::UploadFailed("video.mp4".to_string()).to_string(),
                "Failed to upload video.mp4"
            );
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_file_at_limit_passes() {
            let files = [file_of("a.bin", MAX_ATTACHMENT_BYTES as usize)];
            assert!(validate_file_sizes(&files).is_ok());
        }

        #[test]
        fn test_file_over_limit_is_named() {
            let files = [
                file_of("ok.bin", 16),
                file_of("big.bin", MAX_ATTACHMENT_BYTES as usize + 1),
            ];
            assert_eq!(
                validate_file_sizes(&files),
                Err(ComposeError::FileTooLarge("big.bin".to_string()))
            );
        }

        #[test]
        fn test_quota_boundary() {
            let usage = StorageUsage::new(STORAGE_QUOTA_BYTES - 64);
            assert!(validate_quota(&[file_of("a.bin", 64)], usage).is_ok());
            assert_eq!(
                validate_quota(&[file_of("a.bin", 65)], usage),
                Err(ComposeError::QuotaExceeded)
            );
        }

        #[test]
        fn test_per_file_check_precedes_quota() {
            let usage = StorageUsage::new(STORAGE_QUOTA_BYTES);
            let files = [file_of("big.bin", MAX_ATTACHMENT_BYTES as usize + 1)];
            assert_eq!(
                validate_attachments(&files, usage),
                Err(ComposeError::FileTooLarge("big.bin".to_string()))
            );
        }

        #[test]
        fn test_empty_batch_passes() {
            assert!(validate_attachments(&[], StorageUsage::new(0)).is_ok());
        }
    }

    mod draft_tests {
        use super::*;

        #[test]
        fn test_recipient_address_appends_domain() {
            let draft = Draft::to("bob");
            assert_eq!(draft.recipient_address(), "bob@questmail.com");
        }

        #[test]
        fn test_builder_accumulates() {
            let draft = Draft::to("bob")
                .with_subject("Hi")
                .with_body("Hello")
                .with_onetime(true)
                .with_attachment(file_of("a.bin", 8))
                .with_attachment(file_of("b.bin", 8));
            assert!(draft.onetime);
            assert!(!draft.html);
            assert_eq!(draft.attachments_size(), 16);
        }
    }
}
