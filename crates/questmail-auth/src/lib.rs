//! # questmail-auth
//!
//! Password authentication client for the `QuestMail` backend platform.
//!
//! The platform's auth service issues bearer sessions over a small HTTP API
//! under `/auth/v1`. This crate covers the operations `QuestMail` uses:
//! sign-in with email and password, sign-up, sign-out and fetching the
//! current user, plus the session type with expiry accounting.
//!
//! ## Quick Start
//!
//! ```ignore
//! use questmail_auth::AuthClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AuthClient::new("https://project.example.co", "anon-key")?;
//!
//!     let session = client
//!         .sign_in_with_password("alice@questmail.com", "secret")
//!         .await?;
//!
//!     println!("signed in as {}", session.user.email);
//!
//!     client.sign_out(&session.access_token).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod session;

pub use client::AuthClient;
pub use error::{Error, Result};
pub use session::{AuthUser, ErrorResponse, Session, SessionResponse};
