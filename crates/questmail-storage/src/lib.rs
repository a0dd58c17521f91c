//! # questmail-storage
//!
//! Object storage client for `QuestMail` attachments.
//!
//! The backend platform stores files in buckets behind `/storage/v1`. This
//! crate covers the two operations `QuestMail` needs: uploading a file to a
//! bucket path (refusing to overwrite) and deriving the public URL for a
//! stored object.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bytes::Bytes;
//! use questmail_storage::StorageClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = StorageClient::new("https://project.example.co", "anon-key")?;
//!
//!     let path = "uploader-id/mail-id/report.pdf";
//!     storage
//!         .upload("attachments", path, Bytes::from_static(b"..."), "token")
//!         .await?;
//!
//!     let url = storage.public_url("attachments", path)?;
//!     println!("stored at {url}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;

pub use client::StorageClient;
pub use error::{Error, Result};
