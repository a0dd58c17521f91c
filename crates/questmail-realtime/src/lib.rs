//! # questmail-realtime
//!
//! Realtime change-feed client for the `QuestMail` backend platform.
//!
//! The platform pushes database changes over a websocket speaking the
//! Phoenix channels wire protocol: JSON frames `{topic, event, payload, ref}`
//! where clients join topics configured for `postgres_changes` and the
//! server pushes one frame per matching database change. A heartbeat frame
//! on the reserved `phoenix` topic keeps the connection alive.
//!
//! One background task owns the socket. Subscriptions hand back an event
//! channel; dropping the client and every subscription ends the task.
//!
//! ## Quick Start
//!
//! ```ignore
//! use questmail_realtime::{PostgresChanges, RealtimeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RealtimeClient::connect("https://project.example.co", "anon-key").await?;
//!
//!     let mut inserts = client
//!         .subscribe(PostgresChanges::insert("chat_messages"))
//!         .await?;
//!
//!     while let Some(event) = inserts.next_event().await {
//!         println!("{:?}: {:?}", event.kind, event.record);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod frame;

pub use client::{HEARTBEAT_INTERVAL, RealtimeClient, Subscription};
pub use error::{Error, Result};
pub use frame::{ChangeEvent, ChangeKind, Frame, PostgresChanges, events};
