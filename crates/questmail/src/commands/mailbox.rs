//! Mailbox commands: listing, delete, trash clearing.

use tracing::warn;

use questmail_core::{Folder, MailId, mail};

use crate::cli::{ClearTrashArgs, DeleteArgs, ListArgs};
use crate::commands::account;
use crate::output;

/// Lists one folder, optionally filtered by a search query.
///
/// A failed listing degrades to an empty view; the cause is logged.
pub async fn list(args: ListArgs) -> anyhow::Result<()> {
    let (_, ctx) = account::mail_context(&args.credentials).await?;
    let folder = Folder::from(args.folder);
    let summaries = match mail::fetch_mails(&ctx, folder).await {
        Ok(summaries) => summaries,
        Err(e) => {
            warn!(error = %e, folder = %folder, "mailbox listing failed");
            Vec::new()
        }
    };
    let summaries = match &args.search {
        Some(query) => mail::filter_mails(&summaries, query),
        None => summaries,
    };
    output::print_mail_list(folder, &summaries);
    Ok(())
}

/// Deletes one mail: permanent from the sent folder, a move to trash
/// from everywhere else.
pub async fn delete(args: DeleteArgs) -> anyhow::Result<()> {
    let (_, ctx) = account::mail_context(&args.credentials).await?;
    let folder = Folder::from(args.folder);
    mail::delete_mail(&ctx, folder, MailId::new(args.id)).await?;
    if folder == Folder::Sent {
        println!("Deleted permanently");
    } else {
        println!("Moved to trash");
    }
    Ok(())
}

/// Empties the trash folder.
pub async fn clear_trash(args: ClearTrashArgs) -> anyhow::Result<()> {
    let (_, ctx) = account::mail_context(&args.credentials).await?;
    let cleared = mail::clear_trash(&ctx).await?;
    println!("Cleared {cleared} mails from trash");
    Ok(())
}
