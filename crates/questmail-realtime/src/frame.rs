//! Wire frames for the Phoenix channels protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Well-known frame event names.
pub mod events {
    /// Join a topic.
    pub const PHX_JOIN: &str = "phx_join";
    /// Leave a topic.
    pub const PHX_LEAVE: &str = "phx_leave";
    /// Server acknowledgement of a pushed frame.
    pub const PHX_REPLY: &str = "phx_reply";
    /// Server-side channel error.
    pub const PHX_ERROR: &str = "phx_error";
    /// Server closed the channel.
    pub const PHX_CLOSE: &str = "phx_close";
    /// Keep-alive on the reserved `phoenix` topic.
    pub const HEARTBEAT: &str = "heartbeat";
    /// A database change pushed by the server.
    pub const POSTGRES_CHANGES: &str = "postgres_changes";
    /// Informational server message.
    pub const SYSTEM: &str = "system";
}

/// One websocket frame.
///
/// Every frame in either direction is a JSON object with these four fields;
/// `ref` is a stringified client counter echoed back in replies, null on
/// server-initiated pushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Channel topic, or `phoenix` for connection-level frames.
    pub topic: String,
    /// Event name.
    pub event: String,
    /// Event payload.
    pub payload: Value,
    /// Client message counter.
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

impl Frame {
    /// Builds a join frame for a database change subscription.
    #[must_use]
    pub fn join(topic: impl Into<String>, changes: &PostgresChanges, reference: u64) -> Self {
        Self {
            topic: topic.into(),
            event: events::PHX_JOIN.to_string(),
            payload: json!({ "config": { "postgres_changes": [changes] } }),
            reference: Some(reference.to_string()),
        }
    }

    /// Builds a leave frame for a topic.
    #[must_use]
    pub fn leave(topic: impl Into<String>, reference: u64) -> Self {
        Self {
            topic: topic.into(),
            event: events::PHX_LEAVE.to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    /// Builds a keep-alive frame.
    #[must_use]
    pub fn heartbeat(reference: u64) -> Self {
        Self {
            topic: "phoenix".to_string(),
            event: events::HEARTBEAT.to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }
}

/// Configuration of one database change subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostgresChanges {
    /// Change type to listen for: `INSERT`, `UPDATE`, `DELETE` or `*`.
    pub event: String,
    /// Database schema.
    pub schema: String,
    /// Table name.
    pub table: String,
}

impl PostgresChanges {
    /// Listens for inserts on a table in the `public` schema.
    #[must_use]
    pub fn insert(table: impl Into<String>) -> Self {
        Self {
            event: "INSERT".to_string(),
            schema: "public".to_string(),
            table: table.into(),
        }
    }

    /// Listens for every change type on a table in the `public` schema.
    #[must_use]
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            event: "*".to_string(),
            schema: "public".to_string(),
            table: table.into(),
        }
    }

    /// Channel topic for this subscription.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("realtime:{}:{}", self.schema, self.table)
    }

    /// Whether a pushed change matches this subscription's event filter.
    #[must_use]
    pub fn accepts(&self, kind: ChangeKind) -> bool {
        self.event == "*" || self.event == kind.as_str()
    }
}

/// Change type of a pushed database event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// Row inserted.
    Insert,
    /// Row updated.
    Update,
    /// Row deleted.
    Delete,
}

impl ChangeKind {
    /// Wire name of the change type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// One database change delivered to a subscription.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeEvent {
    /// Change type.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Table the change happened on.
    #[serde(default)]
    pub table: String,
    /// Schema the change happened in.
    #[serde(default)]
    pub schema: String,
    /// Commit timestamp as reported by the server.
    #[serde(default)]
    pub commit_timestamp: Option<String>,
    /// The new row (inserts and updates).
    #[serde(default)]
    pub record: Option<Value>,
    /// The previous row (updates and deletes).
    #[serde(default)]
    pub old_record: Option<Value>,
}

impl ChangeEvent {
    /// Decodes a change from a `postgres_changes` frame payload.
    ///
    /// The payload wraps the change under a `data` key. Returns `None` when
    /// the payload does not carry a decodable change.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let data = payload.get("data")?;
        serde_json::from_value(data.clone()).ok()
    }
}
