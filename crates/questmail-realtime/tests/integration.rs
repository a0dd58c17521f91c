//! Integration tests for the realtime wire protocol.
//!
//! These walk the frame exchanges a live subscription sees, through the
//! crate's public codec surface, without opening a socket.

use questmail_realtime::{ChangeEvent, ChangeKind, Frame, PostgresChanges, events};
use serde_json::json;

#[test]
fn test_join_exchange() {
    let changes = PostgresChanges::insert("chat_messages");
    let topic = changes.topic();
    assert_eq!(topic, "realtime:public:chat_messages");

    let join = Frame::join(&topic, &changes, 1);
    let wire = serde_json::to_value(&join).unwrap();
    assert_eq!(wire["event"], "phx_join");
    assert_eq!(
        wire["payload"]["config"]["postgres_changes"][0]["event"],
        "INSERT"
    );
    assert_eq!(wire["ref"], "1");

    // Server acks the join on the same topic, echoing the ref.
    let reply: Frame = serde_json::from_value(json!({
        "topic": topic,
        "event": "phx_reply",
        "payload": { "status": "ok", "response": {} },
        "ref": "1"
    }))
    .unwrap();
    assert_eq!(reply.event, events::PHX_REPLY);
    assert_eq!(reply.reference.as_deref(), Some("1"));
}

#[test]
fn test_pushed_change_decodes_and_passes_the_filter() {
    let changes = PostgresChanges::insert("chat_messages");

    let push: Frame = serde_json::from_value(json!({
        "topic": "realtime:public:chat_messages",
        "event": "postgres_changes",
        "payload": {
            "ids": [77],
            "data": {
                "type": "INSERT",
                "schema": "public",
                "table": "chat_messages",
                "commit_timestamp": "2026-02-03T10:00:00Z",
                "record": { "id": 77, "username": "alice", "message": "hello" }
            }
        },
        "ref": null
    }))
    .unwrap();
    assert_eq!(push.event, events::POSTGRES_CHANGES);
    assert!(push.reference.is_none());

    let event = ChangeEvent::from_payload(&push.payload).unwrap();
    assert_eq!(event.kind, ChangeKind::Insert);
    assert!(changes.accepts(event.kind));
    assert_eq!(event.record.unwrap()["message"], "hello");
}

#[test]
fn test_presence_subscription_accepts_every_change_type() {
    let presence = PostgresChanges::all("online_users");
    for kind in [ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete] {
        assert!(presence.accepts(kind));
    }

    let delete = ChangeEvent::from_payload(&json!({
        "data": {
            "type": "DELETE",
            "schema": "public",
            "table": "online_users",
            "old_record": { "user_id": "11111111-1111-4111-8111-111111111111" }
        }
    }))
    .unwrap();
    assert!(presence.accepts(delete.kind));
    assert!(delete.record.is_none());
}

#[test]
fn test_keep_alive_and_leave_frames() {
    let heartbeat = serde_json::to_value(Frame::heartbeat(9)).unwrap();
    assert_eq!(heartbeat["topic"], "phoenix");
    assert_eq!(heartbeat["event"], "heartbeat");
    assert_eq!(heartbeat["payload"], json!({}));

    let leave = serde_json::to_value(Frame::leave("realtime:public:online_users", 10)).unwrap();
    assert_eq!(leave["event"], "phx_leave");
    assert_eq!(leave["ref"], "10");
}
