//! Chat service operations.
//!
//! Joining, leaving, the history snapshot, presence writes and message
//! sends. The chat project is separate from the mail project; every call
//! here runs under its anonymous key with identity carried in row
//! payloads.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use questmail_postgrest::Order;
use questmail_realtime::{PostgresChanges, RealtimeClient, Subscription};

use crate::chat::model::{
    CHAT_HISTORY_LIMIT, ChatError, ChatMessage, ChatResult, NewChatMessage, OnlineUser,
};
use crate::chat::session::ChatSession;
use crate::context::ChatContext;
use crate::error::Result;

/// The two live subscriptions a chat session consumes.
#[derive(Debug)]
pub struct ChatFeeds {
    /// New chat message inserts.
    pub messages: Subscription,
    /// Any change to presence rows.
    pub presence: Subscription,
}

/// Joins the chat: mark presence, load the snapshot, open both feeds,
/// fetch who is online.
///
/// A failed snapshot leaves the session empty with a sticky error banner;
/// a failed presence write is logged and ignored. Either way the session
/// comes back active.
///
/// # Errors
///
/// Returns an error when a subscription cannot be opened.
pub async fn enter(
    ctx: &ChatContext,
    realtime: &RealtimeClient,
) -> Result<(ChatSession, ChatFeeds)> {
    let mut session = ChatSession::new();
    upsert_presence(ctx).await;

    match load_recent_messages(ctx).await {
        Ok(messages) => session.set_history(messages),
        Err(error) => session.set_error(error),
    }

    let messages = realtime
        .subscribe(PostgresChanges::insert("chat_messages"))
        .await?;
    let presence = realtime
        .subscribe(PostgresChanges::all("online_users"))
        .await?;

    refresh_online(ctx, &mut session).await;
    session.activate();
    debug!(user = %ctx.user_id(), "chat session active");
    Ok((session, ChatFeeds { messages, presence }))
}

/// Leaves the chat: drop the presence row, then release both feeds.
///
/// The presence delete is best effort and never retried; a failure leaves
/// a stale row behind until a future upsert overwrites it.
pub async fn leave(ctx: &ChatContext, session: &mut ChatSession, feeds: ChatFeeds) {
    session.begin_leaving();
    if let Err(e) = delete_presence(ctx).await {
        warn!(error = %e, user = %ctx.user_id(), "presence delete failed, stale row remains");
    }
    let ChatFeeds { messages, presence } = feeds;
    messages.unsubscribe().await;
    presence.unsubscribe().await;
    debug!(user = %ctx.user_id(), "chat session closed");
}

/// Marks the user online. The write is keyed on the user id, so
/// re-entering refreshes the existing row instead of duplicating it.
/// Failures are logged only.
pub async fn upsert_presence(ctx: &ChatContext) {
    let row = json!({
        "user_id": ctx.user_id(),
        "username": ctx.username(),
        "email": ctx.user.email,
        "last_seen": Utc::now(),
        "is_online": true,
    });
    if let Err(e) = ctx
        .db
        .from("online_users")
        .upsert(row, "user_id")
        .execute()
        .await
    {
        warn!(error = %e, user = %ctx.user_id(), "presence upsert failed");
    }
}

/// Removes the user's presence row.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete_presence(ctx: &ChatContext) -> Result<()> {
    ctx.db
        .from("online_users")
        .delete()
        .eq("user_id", ctx.user_id())
        .execute()
        .await?;
    Ok(())
}

/// Loads the newest [`CHAT_HISTORY_LIMIT`] messages, oldest first.
///
/// # Errors
///
/// Returns [`ChatError::LoadMessages`]; the underlying cause is logged.
pub async fn load_recent_messages(ctx: &ChatContext) -> ChatResult<Vec<ChatMessage>> {
    let mut rows: Vec<ChatMessage> = ctx
        .db
        .from("chat_messages")
        .select("*")
        .order("created_at", Order::Descending)
        .limit(CHAT_HISTORY_LIMIT)
        .fetch()
        .await
        .map_err(|e| {
            warn!(error = %e, "chat history load failed");
            ChatError::LoadMessages
        })?;
    rows.reverse();
    Ok(rows)
}

/// Fetches the full presence list.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn fetch_online_users(ctx: &ChatContext) -> Result<Vec<OnlineUser>> {
    Ok(ctx.db.from("online_users").select("*").fetch().await?)
}

/// Re-fetches the presence list into the session after any presence-feed
/// event. There is no incremental merge; a failure keeps the previous
/// list and is logged.
pub async fn refresh_online(ctx: &ChatContext, session: &mut ChatSession) {
    match fetch_online_users(ctx).await {
        Ok(users) => session.set_online(users),
        Err(e) => warn!(error = %e, "presence refresh failed"),
    }
}

/// Sends a chat message. Blank or whitespace-only text is dropped without
/// a round trip.
///
/// # Errors
///
/// Returns [`ChatError::SendMessage`]; the underlying cause is logged.
pub async fn send_message(ctx: &ChatContext, text: &str) -> ChatResult<()> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }
    let row = NewChatMessage {
        user_id: ctx.user_id(),
        username: ctx.username(),
        email: ctx.user.email.clone(),
        message: text.to_string(),
    };
    let payload = serde_json::to_value(&row).map_err(|e| {
        warn!(error = %e, "chat row did not serialize");
        ChatError::SendMessage
    })?;
    ctx.db
        .from("chat_messages")
        .insert(payload)
        .execute()
        .await
        .map_err(|e| {
            warn!(error = %e, "chat message insert failed");
            ChatError::SendMessage
        })?;
    debug!(user = %ctx.user_id(), "chat message sent");
    Ok(())
}
