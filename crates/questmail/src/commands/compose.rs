//! The send command and attachment staging.

use std::path::Path;

use anyhow::Context as _;
use bytes::Bytes;

use questmail_core::{AttachmentUpload, Draft, mail};

use crate::cli::SendArgs;
use crate::commands::account;

/// Composes and sends a new mail.
pub async fn send(args: SendArgs) -> anyhow::Result<()> {
    let SendArgs {
        credentials,
        to,
        subject,
        body,
        html,
        onetime,
        attachments,
    } = args;
    let (_, ctx) = account::mail_context(&credentials).await?;

    let mut draft = Draft::to(to)
        .with_subject(subject)
        .with_body(body)
        .with_html(html)
        .with_onetime(onetime);
    for path in &attachments {
        draft = draft.with_attachment(read_attachment(path).await?);
    }

    let id = mail::send_mail(&ctx, &draft).await?;
    println!("Sent {id}");
    Ok(())
}

/// Stages one file from disk for upload.
pub(super) async fn read_attachment(path: &Path) -> anyhow::Result<AttachmentUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    Ok(AttachmentUpload::new(name, Bytes::from(bytes)))
}
