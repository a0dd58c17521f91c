//! Mail service operations.
//!
//! High-level flows over the mail project: folder listing, compose and
//! reply, per-folder delete semantics, trash clearing, thread loading and
//! storage accounting. Multi-step flows are best effort; nothing is
//! rolled back and nothing is retried.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use questmail_postgrest::Order;

use crate::context::MailContext;
use crate::directory;
use crate::error::Result;
use crate::id::{MailId, UserId};
use crate::mail::compose::{
    AttachmentUpload, ComposeError, ComposeResult, Draft, validate_file_sizes, validate_quota,
};
use crate::mail::model::{Attachment, Folder, Mail, MailSummary, NewMail, StorageUsage};
use crate::mail::thread::{Thread, ThreadMessage, dedupe_mails};

/// Storage bucket holding attachment objects.
pub const ATTACHMENTS_BUCKET: &str = "attachments";

/// Fetches one folder of mail, newest first, with addresses resolved.
///
/// The sent folder lists everything the user sent regardless of folder
/// labels; every other folder filters on recipient and folder name.
///
/// # Errors
///
/// Returns an error if the mail query fails. Directory misses degrade to
/// `Unknown` per row instead of failing the listing.
pub async fn fetch_mails(ctx: &MailContext, folder: Folder) -> Result<Vec<MailSummary>> {
    let query = ctx.db.from("mails").auth(ctx.token()).select("*");
    let query = if folder == Folder::Sent {
        query.eq("sender", ctx.user_id())
    } else {
        query
            .eq("recipient", ctx.user_id())
            .eq("folder", folder.as_str())
    };
    let mails: Vec<Mail> = query
        .order("created_at", Order::Descending)
        .fetch()
        .await?;
    debug!(folder = %folder, count = mails.len(), "fetched mail");

    let mut summaries = Vec::with_capacity(mails.len());
    for mail in mails {
        let sender_email = directory::email_for(ctx, mail.sender).await;
        let recipient_email = directory::email_for(ctx, mail.recipient).await;
        summaries.push(MailSummary {
            mail,
            sender_email,
            recipient_email,
        });
    }
    Ok(summaries)
}

/// Fetches one mail by id.
///
/// # Errors
///
/// Returns an error if the query fails or no such row exists.
pub async fn fetch_mail(ctx: &MailContext, id: MailId) -> Result<Mail> {
    Ok(ctx
        .db
        .from("mails")
        .auth(ctx.token())
        .select("*")
        .eq("id", id)
        .single()
        .fetch()
        .await?)
}

/// Filters summaries by a search query: case-insensitive substring over
/// subject, body and both addresses. A blank query keeps everything.
#[must_use]
pub fn filter_mails(summaries: &[MailSummary], query: &str) -> Vec<MailSummary> {
    let query = query.trim();
    if query.is_empty() {
        return summaries.to_vec();
    }
    summaries
        .iter()
        .filter(|summary| summary.matches(query))
        .cloned()
        .collect()
}

/// Sends a draft: resolve the recipient, validate the attachments, insert
/// the mail, then upload the files.
///
/// Uploads happen after the insert; a failed upload aborts the remainder
/// and the mail keeps whatever attachments landed before it.
///
/// # Errors
///
/// Returns a user-facing [`ComposeError`]; underlying causes are logged.
pub async fn send_mail(ctx: &MailContext, draft: &Draft) -> ComposeResult<MailId> {
    let recipient = resolve_recipient(ctx, &draft.recipient_address()).await?;
    validate_file_sizes(&draft.attachments)?;
    if !draft.attachments.is_empty() {
        validate_quota(&draft.attachments, usage_or_zero(ctx).await)?;
    }

    let row = NewMail {
        sender: ctx.user_id(),
        recipient,
        subject: draft.subject.clone(),
        body: draft.body.clone(),
        html: draft.html,
        onetime: draft.onetime,
        folder: Folder::Inbox,
        thread_id: None,
    };
    let mail_id = insert_mail(ctx, &row, ComposeError::SendFailed).await?;
    upload_attachments(ctx, mail_id, &draft.attachments).await?;
    debug!(mail = %mail_id, "mail sent");
    Ok(mail_id)
}

/// Replies within a thread: the recipient is the original sender, the
/// subject gains a `Re:` prefix and the thread root carries over.
///
/// # Errors
///
/// Returns a user-facing [`ComposeError`]; underlying causes are logged.
pub async fn send_reply(
    ctx: &MailContext,
    original: &Mail,
    body: &str,
    html: bool,
    files: &[AttachmentUpload],
) -> ComposeResult<MailId> {
    validate_file_sizes(files)?;
    if !files.is_empty() {
        validate_quota(files, usage_or_zero(ctx).await)?;
    }

    let row = NewMail {
        sender: ctx.user_id(),
        recipient: original.sender,
        subject: format!("Re: {}", original.subject),
        body: body.to_string(),
        html,
        onetime: false,
        folder: Folder::Inbox,
        thread_id: Some(original.thread_root()),
    };
    let mail_id = insert_mail(ctx, &row, ComposeError::ReplyFailed).await?;
    upload_attachments(ctx, mail_id, files).await?;
    debug!(mail = %mail_id, thread = %original.thread_root(), "reply sent");
    Ok(mail_id)
}

/// Deletes a mail with per-folder semantics: permanent in the sent folder
/// (attachment rows first, then the mail row), a soft move to trash
/// everywhere else.
///
/// Storage objects are never removed; only their rows are.
///
/// # Errors
///
/// Returns an error if the mail mutation fails. A failed attachment-row
/// delete is logged and the mail delete still runs.
pub async fn delete_mail(ctx: &MailContext, folder: Folder, id: MailId) -> Result<()> {
    if folder == Folder::Sent {
        if let Err(e) = ctx
            .db
            .from("attachments")
            .auth(ctx.token())
            .delete()
            .eq("mail_id", id)
            .execute()
            .await
        {
            warn!(error = %e, mail = %id, "attachment row delete failed");
        }
        ctx.db
            .from("mails")
            .auth(ctx.token())
            .delete()
            .eq("id", id)
            .execute()
            .await?;
        debug!(mail = %id, "mail deleted permanently");
    } else {
        ctx.db
            .from("mails")
            .auth(ctx.token())
            .update(json!({ "folder": Folder::Trash }))
            .eq("id", id)
            .execute()
            .await?;
        debug!(mail = %id, "mail moved to trash");
    }
    Ok(())
}

/// Empties the trash for the signed-in user.
///
/// Collects trash mail ids where the user is sender or recipient, deletes
/// their attachment rows in one batch, then the mail rows. Each delete is
/// best effort; a failure is logged and the remaining steps still run.
///
/// # Errors
///
/// Returns an error if the id query fails.
pub async fn clear_trash(ctx: &MailContext) -> Result<usize> {
    #[derive(Deserialize)]
    struct Row {
        id: MailId,
    }

    let user = ctx.user_id();
    let filter = format!(
        "and(recipient.eq.{user},folder.eq.trash),and(sender.eq.{user},folder.eq.trash)"
    );
    let rows: Vec<Row> = ctx
        .db
        .from("mails")
        .auth(ctx.token())
        .select("id")
        .or(filter)
        .fetch()
        .await?;
    if rows.is_empty() {
        return Ok(0);
    }
    let ids: Vec<MailId> = rows.into_iter().map(|row| row.id).collect();

    if let Err(e) = ctx
        .db
        .from("attachments")
        .auth(ctx.token())
        .delete()
        .in_list("mail_id", ids.iter())
        .execute()
        .await
    {
        warn!(error = %e, "trash attachment delete failed");
    }
    if let Err(e) = ctx
        .db
        .from("mails")
        .auth(ctx.token())
        .delete()
        .eq("recipient", user)
        .eq("folder", Folder::Trash)
        .execute()
        .await
    {
        warn!(error = %e, "received trash delete failed");
    }
    if let Err(e) = ctx
        .db
        .from("mails")
        .auth(ctx.token())
        .delete()
        .eq("sender", user)
        .eq("folder", Folder::Trash)
        .execute()
        .await
    {
        warn!(error = %e, "sent trash delete failed");
    }
    debug!(count = ids.len(), "trash cleared");
    Ok(ids.len())
}

/// Sums the user's attachment sizes against the quota.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn storage_usage(ctx: &MailContext) -> Result<StorageUsage> {
    #[derive(Deserialize)]
    struct Row {
        size_bytes: Option<u64>,
    }

    let rows: Vec<Row> = ctx
        .db
        .from("attachments")
        .auth(ctx.token())
        .select("size_bytes")
        .eq("uploader", ctx.user_id())
        .fetch()
        .await?;
    let used = rows.iter().map(|row| row.size_bytes.unwrap_or(0)).sum();
    Ok(StorageUsage::new(used))
}

/// Loads the thread containing a mail: every row sharing its thread root,
/// oldest first, de-duplicated, with senders resolved and attachments
/// fetched in one batch.
///
/// # Errors
///
/// Returns an error if the thread or attachment query fails.
pub async fn load_thread(ctx: &MailContext, mail: &Mail) -> Result<Thread> {
    let root = mail.thread_root();
    let rows: Vec<Mail> = ctx
        .db
        .from("mails")
        .auth(ctx.token())
        .select("*")
        .or(format!("thread_id.eq.{root},id.eq.{root}"))
        .order("created_at", Order::Ascending)
        .fetch()
        .await?;
    let mails = dedupe_mails(rows);

    let attachments: Vec<Attachment> = if let Some(ids) = attachment_scope(&mails) {
        ctx.db
            .from("attachments")
            .auth(ctx.token())
            .select("*")
            .in_list("mail_id", ids.iter())
            .fetch()
            .await?
    } else {
        Vec::new()
    };
    let mut by_mail: HashMap<MailId, Vec<Attachment>> = HashMap::new();
    for attachment in attachments {
        by_mail.entry(attachment.mail_id).or_default().push(attachment);
    }

    let mut messages = Vec::with_capacity(mails.len());
    for mail in mails {
        let sender_email = directory::email_for(ctx, mail.sender).await;
        let attachments = by_mail.remove(&mail.id).unwrap_or_default();
        messages.push(ThreadMessage {
            mail,
            sender_email,
            attachments,
        });
    }
    debug!(root = %root, count = messages.len(), "thread resolved");
    Ok(Thread { root, messages })
}

/// Marks a mail read on open, skipping mails already read. Failures are
/// logged only; one-time deletion is a close concern, not an open one.
pub async fn mark_read(ctx: &MailContext, mail: &Mail) {
    if mail.read {
        return;
    }
    if let Err(e) = ctx
        .db
        .from("mails")
        .auth(ctx.token())
        .update(json!({ "read": true }))
        .eq("id", mail.id)
        .execute()
        .await
    {
        warn!(error = %e, mail = %mail.id, "mark read failed");
    }
}

/// Side effect of dismissing a mail view: a one-time mail self-destructs,
/// attachment rows first, then the mail row. Anything else is a no-op.
///
/// # Errors
///
/// Returns an error if a delete fails; rows already deleted stay deleted.
pub async fn close_mail(ctx: &MailContext, mail: &Mail) -> Result<()> {
    if !mail.onetime {
        return Ok(());
    }
    debug!(mail = %mail.id, "destroying one-time mail");
    ctx.db
        .from("attachments")
        .auth(ctx.token())
        .delete()
        .eq("mail_id", mail.id)
        .execute()
        .await?;
    ctx.db
        .from("mails")
        .auth(ctx.token())
        .delete()
        .eq("id", mail.id)
        .execute()
        .await?;
    Ok(())
}

/// Storage path for one attachment object.
#[must_use]
pub fn attachment_path(uploader: UserId, mail: MailId, file_name: &str) -> String {
    format!("{uploader}/{mail}/{file_name}")
}

// Ids to fetch attachments for, `None` when the thread came back empty.
// The table service rejects an `in` filter over an empty list.
fn attachment_scope(mails: &[Mail]) -> Option<Vec<MailId>> {
    if mails.is_empty() {
        None
    } else {
        Some(mails.iter().map(|m| m.id).collect())
    }
}

async fn resolve_recipient(ctx: &MailContext, address: &str) -> ComposeResult<UserId> {
    match directory::find_by_email(ctx, address).await {
        Ok(Some(entry)) => Ok(entry.id),
        Ok(None) => Err(ComposeError::RecipientNotFound),
        Err(e) => {
            warn!(error = %e, "recipient lookup failed");
            Err(ComposeError::RecipientNotFound)
        }
    }
}

// Quota checks treat an unreadable usage as zero rather than blocking the
// send.
async fn usage_or_zero(ctx: &MailContext) -> StorageUsage {
    match storage_usage(ctx).await {
        Ok(usage) => usage,
        Err(e) => {
            warn!(error = %e, "usage lookup failed");
            StorageUsage::default()
        }
    }
}

async fn insert_mail(
    ctx: &MailContext,
    row: &NewMail,
    failure: ComposeError,
) -> ComposeResult<MailId> {
    let payload = match serde_json::to_value(row) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "mail row did not serialize");
            return Err(failure);
        }
    };
    match ctx
        .db
        .from("mails")
        .auth(ctx.token())
        .insert(payload)
        .select("*")
        .single()
        .fetch::<Mail>()
        .await
    {
        Ok(inserted) => Ok(inserted.id),
        Err(e) => {
            warn!(error = %e, "mail insert failed");
            Err(failure)
        }
    }
}

async fn upload_attachments(
    ctx: &MailContext,
    mail: MailId,
    files: &[AttachmentUpload],
) -> ComposeResult<()> {
    for file in files {
        let path = attachment_path(ctx.user_id(), mail, &file.file_name);
        if let Err(e) = ctx
            .storage
            .upload(ATTACHMENTS_BUCKET, &path, file.bytes.clone(), ctx.token())
            .await
        {
            warn!(error = %e, file = %file.file_name, "attachment upload failed");
            return Err(ComposeError::UploadFailed(file.file_name.clone()));
        }

        let file_url = match ctx.storage.public_url(ATTACHMENTS_BUCKET, &path) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!(error = %e, file = %file.file_name, "public url failed");
                String::new()
            }
        };
        // The object is already stored; a failed row insert leaves it
        // unlisted but is not treated as an upload failure.
        if let Err(e) = ctx
            .db
            .from("attachments")
            .auth(ctx.token())
            .insert(json!({
                "mail_id": mail,
                "file_url": file_url,
                "size_bytes": file.size(),
                "uploader": ctx.user_id(),
            }))
            .execute()
            .await
        {
            warn!(error = %e, file = %file.file_name, "attachment row insert failed");
        }
        debug!(file = %file.file_name, mail = %mail, "attachment stored");
    }
    Ok(())
}
