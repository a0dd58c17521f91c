//! In-memory chat session state.
//!
//! One [`ChatSession`] is the single state store behind a chat view. The
//! snapshot and both live feeds write into it through the methods here;
//! rendering reads from it. Feed events may interleave in any order
//! between the two subscriptions, so every mutation is either an
//! idempotent append or a full replacement.

use std::collections::HashSet;

use questmail_realtime::{ChangeEvent, ChangeKind};
use tracing::warn;

use crate::chat::model::{CHAT_HISTORY_LIMIT, ChatError, ChatMessage, OnlineUser};
use crate::id::UserId;

/// Lifecycle phase of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    /// Presence, snapshot and subscriptions being set up.
    Entering,
    /// Feeds live; events mutate state.
    Active,
    /// Teardown started; no further mutations expected.
    Leaving,
}

/// State store fed by the history snapshot and both live feeds.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    online: Vec<OnlineUser>,
    typing: HashSet<UserId>,
    error: Option<ChatError>,
    phase: ChatPhase,
}

impl ChatSession {
    /// Creates an empty session in the entering phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            online: Vec::new(),
            typing: HashSet::new(),
            error: None,
            phase: ChatPhase::Entering,
        }
    }

    /// Messages oldest first, at most [`CHAT_HISTORY_LIMIT`] of them.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Presence rows from the latest refresh.
    #[must_use]
    pub fn online_users(&self) -> &[OnlineUser] {
        &self.online
    }

    /// Sticky error banner; cleared by the next inbound message.
    #[must_use]
    pub const fn error(&self) -> Option<ChatError> {
        self.error
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Applies one raw message-feed event. Only inserts carrying a
    /// decodable row are applied; everything else is ignored. Returns
    /// `true` when a message was appended.
    pub fn apply_message_event(&mut self, event: &ChangeEvent) -> bool {
        if event.kind != ChangeKind::Insert {
            return false;
        }
        let Some(record) = &event.record else {
            return false;
        };
        match serde_json::from_value::<ChatMessage>(record.clone()) {
            Ok(message) => self.apply_message(message),
            Err(e) => {
                warn!(error = %e, "chat row did not decode");
                false
            }
        }
    }

    /// Applies one inbound message: clear the error banner, drop
    /// duplicates by id, append, and evict from the front past
    /// [`CHAT_HISTORY_LIMIT`]. Returns `true` when the message was
    /// appended, `false` for a duplicate.
    pub fn apply_message(&mut self, message: ChatMessage) -> bool {
        self.error = None;
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        self.messages.push(message);
        if self.messages.len() > CHAT_HISTORY_LIMIT {
            let excess = self.messages.len() - CHAT_HISTORY_LIMIT;
            self.messages.drain(..excess);
        }
        true
    }

    /// Marks a user typing or not. Local bookkeeping only; nothing is
    /// broadcast to other clients.
    pub fn set_typing(&mut self, user: UserId, typing: bool) {
        if typing {
            self.typing.insert(user);
        } else {
            self.typing.remove(&user);
        }
    }

    /// Display names of users currently typing, excluding `viewer`.
    /// Names resolve through the presence list, falling back to
    /// `Someone`.
    #[must_use]
    pub fn typing_names(&self, viewer: UserId) -> Vec<String> {
        self.typing
            .iter()
            .filter(|user| **user != viewer)
            .map(|user| {
                self.online
                    .iter()
                    .find(|online| online.user_id == *user)
                    .map_or_else(|| "Someone".to_string(), |online| online.username.clone())
            })
            .collect()
    }

    pub(crate) fn set_history(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub(crate) fn set_online(&mut self, users: Vec<OnlineUser>) {
        self.online = users;
    }

    pub(crate) fn set_error(&mut self, error: ChatError) {
        self.error = Some(error);
    }

    pub(crate) fn activate(&mut self) {
        self.phase = ChatPhase::Active;
    }

    pub(crate) fn begin_leaving(&mut self) {
        self.phase = ChatPhase::Leaving;
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn message(id: i64) -> ChatMessage {
        ChatMessage {
            id,
            user_id: UserId::new(Uuid::new_v4()),
            username: "alice".to_string(),
            email: "alice@questmail.com".to_string(),
            message: format!("message {id}"),
            created_at: Utc::now(),
        }
    }

    fn online(user_id: UserId, username: &str) -> OnlineUser {
        OnlineUser {
            id: 1,
            user_id,
            username: username.to_string(),
            email: format!("{username}@questmail.com"),
            last_seen: Utc::now(),
            is_online: true,
        }
    }

    mod phase_tests {
        use super::*;

        #[test]
        fn test_phases_advance() {
            let mut session = ChatSession::new();
            assert_eq!(session.phase(), ChatPhase::Entering);
            session.activate();
            assert_eq!(session.phase(), ChatPhase::Active);
            session.begin_leaving();
            assert_eq!(session.phase(), ChatPhase::Leaving);
        }
    }

    mod message_tests {
        use super::*;

        #[test]
        fn test_append_dedupes_by_id() {
            let mut session = ChatSession::new();
            assert!(session.apply_message(message(1)));
            assert!(!session.apply_message(message(1)));
            assert_eq!(session.messages().len(), 1);
        }

        #[test]
        fn test_sixty_events_keep_newest_fifty_in_order() {
            let mut session = ChatSession::new();
            for id in 0..60 {
                session.apply_message(message(id));
            }
            let ids: Vec<i64> = session.messages().iter().map(|m| m.id).collect();
            assert_eq!(ids.len(), CHAT_HISTORY_LIMIT);
            assert_eq!(ids.first(), Some(&10));
            assert_eq!(ids.last(), Some(&59));
        }

        #[test]
        fn test_inbound_message_clears_error() {
            let mut session = ChatSession::new();
            session.set_error(ChatError::LoadMessages);
            assert_eq!(session.error(), Some(ChatError::LoadMessages));
            session.apply_message(message(1));
            assert_eq!(session.error(), None);
        }

        #[test]
        fn test_history_snapshot_installs() {
            let mut session = ChatSession::new();
            session.set_history(vec![message(1), message(2)]);
            assert_eq!(session.messages().len(), 2);
        }
    }

    mod event_tests {
        use super::*;

        fn insert_event(record: serde_json::Value) -> ChangeEvent {
            serde_json::from_value(json!({
                "type": "INSERT",
                "table": "chat_messages",
                "schema": "public",
                "record": record,
            }))
            .unwrap()
        }

        #[test]
        fn test_insert_event_appends() {
            let mut session = ChatSession::new();
            let appended = session.apply_message_event(&insert_event(json!({
                "id": 9,
                "user_id": "11111111-1111-4111-8111-111111111111",
                "username": "alice",
                "email": "alice@questmail.com",
                "message": "hello",
                "created_at": "2025-07-26T22:45:44Z",
            })));
            assert!(appended);
            assert_eq!(session.messages().len(), 1);
            assert_eq!(session.messages()[0].id, 9);
        }

        #[test]
        fn test_non_insert_event_is_ignored() {
            let mut session = ChatSession::new();
            let event: ChangeEvent = serde_json::from_value(json!({
                "type": "DELETE",
                "table": "chat_messages",
                "schema": "public",
                "old_record": { "id": 9 },
            }))
            .unwrap();
            assert!(!session.apply_message_event(&event));
            assert!(session.messages().is_empty());
        }

        #[test]
        fn test_undecodable_record_is_ignored() {
            let mut session = ChatSession::new();
            assert!(!session.apply_message_event(&insert_event(json!({ "id": "not-a-number" }))));
            assert!(session.messages().is_empty());
        }
    }

    mod typing_tests {
        use super::*;

        #[test]
        fn test_typing_set_is_local_and_reversible() {
            let mut session = ChatSession::new();
            let viewer = UserId::new(Uuid::new_v4());
            let other = UserId::new(Uuid::new_v4());
            session.set_online(vec![online(other, "bob")]);

            session.set_typing(other, true);
            assert_eq!(session.typing_names(viewer), vec!["bob".to_string()]);

            session.set_typing(other, false);
            assert!(session.typing_names(viewer).is_empty());
        }

        #[test]
        fn test_viewer_is_excluded() {
            let mut session = ChatSession::new();
            let viewer = UserId::new(Uuid::new_v4());
            session.set_typing(viewer, true);
            assert!(session.typing_names(viewer).is_empty());
        }

        #[test]
        fn test_unknown_typist_falls_back() {
            let mut session = ChatSession::new();
            let viewer = UserId::new(Uuid::new_v4());
            let stranger = UserId::new(Uuid::new_v4());
            session.set_typing(stranger, true);
            assert_eq!(session.typing_names(viewer), vec!["Someone".to_string()]);
        }
    }
}
