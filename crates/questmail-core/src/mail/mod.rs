//! Mail domain: models, compose validation, thread resolution and services.

mod compose;
mod model;
mod service;
mod thread;

pub use compose::{
    AttachmentUpload, ComposeError, ComposeResult, Draft, validate_attachments,
    validate_file_sizes, validate_quota,
};
pub use model::{
    Attachment, Folder, MAIL_DOMAIN, MAX_ATTACHMENT_BYTES, Mail, MailSummary, NewMail,
    STORAGE_QUOTA_BYTES, StorageUsage, display_address, full_address,
};
pub use service::{
    ATTACHMENTS_BUCKET, attachment_path, clear_trash, close_mail, delete_mail, fetch_mail,
    fetch_mails, filter_mails, load_thread, mark_read, send_mail, send_reply, storage_usage,
};
pub use thread::{Thread, ThreadMessage, dedupe_mails};
