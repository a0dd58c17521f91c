//! Storage gauge command.

use questmail_core::mail;

use crate::cli::StorageArgs;
use crate::commands::account;
use crate::output;

/// Shows attachment storage usage against the 100MB quota.
pub async fn show(args: StorageArgs) -> anyhow::Result<()> {
    let (_, ctx) = account::mail_context(&args.credentials).await?;
    let usage = mail::storage_usage(&ctx).await?;
    output::print_storage(usage);
    Ok(())
}
