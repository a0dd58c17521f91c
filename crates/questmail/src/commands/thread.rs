//! Thread view and reply commands.

use tracing::warn;

use questmail_core::{MailId, mail};

use crate::cli::{OpenArgs, ReplyArgs};
use crate::commands::{account, compose};
use crate::output;

/// Opens a mail: mark it read, print its thread, then close it. Closing
/// destroys a one-time mail.
///
/// A failed thread load degrades to an empty view; the cause is logged.
pub async fn open(args: OpenArgs) -> anyhow::Result<()> {
    let (_, ctx) = account::mail_context(&args.credentials).await?;
    let opened = mail::fetch_mail(&ctx, MailId::new(args.id)).await?;
    mail::mark_read(&ctx, &opened).await;
    match mail::load_thread(&ctx, &opened).await {
        Ok(thread) => output::print_thread(&thread),
        Err(e) => warn!(error = %e, mail = %opened.id, "thread load failed"),
    }
    mail::close_mail(&ctx, &opened).await?;
    if opened.onetime {
        println!("One-time mail destroyed");
    }
    Ok(())
}

/// Replies to a mail within its thread.
pub async fn reply(args: ReplyArgs) -> anyhow::Result<()> {
    let ReplyArgs {
        credentials,
        id,
        body,
        html,
        attachments,
    } = args;
    let (_, ctx) = account::mail_context(&credentials).await?;
    let original = mail::fetch_mail(&ctx, MailId::new(id)).await?;

    let mut files = Vec::with_capacity(attachments.len());
    for path in &attachments {
        files.push(compose::read_attachment(path).await?);
    }

    let reply_id = mail::send_reply(&ctx, &original, &body, html, &files).await?;
    println!("Sent {reply_id}");
    Ok(())
}
