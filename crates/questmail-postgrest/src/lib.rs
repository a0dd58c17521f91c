//! # questmail-postgrest
//!
//! Minimal PostgREST table client used by `QuestMail` to talk to the backend
//! platform's REST gateway.
//!
//! The platform exposes every table under `/rest/v1/{table}` with a small
//! filter grammar in the query string (`col=eq.value`, `col=in.(a,b)`,
//! `or=(...)`, `order=col.desc`, `limit=n`). This crate covers exactly the
//! subset `QuestMail` uses: select, insert, upsert, update and delete with
//! equality/membership/disjunction filters, ordering, limits and singular
//! responses.
//!
//! ## Quick Start
//!
//! ```ignore
//! use questmail_postgrest::{Order, PostgrestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PostgrestClient::new("https://project.example.co", "anon-key")?;
//!
//!     let rows: Vec<serde_json::Value> = client
//!         .from("mails")
//!         .auth("user-access-token")
//!         .select("*")
//!         .eq("folder", "inbox")
//!         .order("created_at", Order::Descending)
//!         .fetch()
//!         .await?;
//!
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod query;

pub use client::PostgrestClient;
pub use error::{Error, Result};
pub use query::{Order, Query};
