//! User directory lookups.
//!
//! The `public_users` view maps user ids to emails and back. Mail rows
//! store ids only, so every list and thread render resolves addresses
//! here; a miss or a failed lookup degrades to [`UNKNOWN_ADDRESS`] on the
//! display path rather than surfacing an error.

use serde::Deserialize;
use tracing::warn;

use crate::context::MailContext;
use crate::error::Result;
use crate::id::UserId;

/// Fallback shown when an address cannot be resolved.
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// One row of the `public_users` view.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    /// User id.
    pub id: UserId,
    /// Account email.
    pub email: String,
}

/// Resolves a user id to an email for display.
///
/// Failures and misses degrade to [`UNKNOWN_ADDRESS`]; the underlying
/// error is logged, not returned.
pub async fn email_for(ctx: &MailContext, id: UserId) -> String {
    let result = ctx
        .db
        .from("public_users")
        .auth(ctx.token())
        .select("id,email")
        .eq("id", id)
        .limit(1)
        .fetch::<Vec<DirectoryEntry>>()
        .await;

    match result {
        Ok(rows) => rows
            .into_iter()
            .next()
            .map_or_else(|| UNKNOWN_ADDRESS.to_string(), |row| row.email),
        Err(e) => {
            warn!(error = %e, user = %id, "directory lookup failed");
            UNKNOWN_ADDRESS.to_string()
        }
    }
}

/// Finds a user by exact email.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_by_email(ctx: &MailContext, email: &str) -> Result<Option<DirectoryEntry>> {
    let rows: Vec<DirectoryEntry> = ctx
        .db
        .from("public_users")
        .auth(ctx.token())
        .select("id,email")
        .eq("email", email)
        .limit(1)
        .fetch()
        .await?;
    Ok(rows.into_iter().next())
}
