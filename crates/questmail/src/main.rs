//! `QuestMail` - Terminal webmail and chat client
//!
//! Drives the QuestMail platform from the command line: mailbox listing,
//! compose and reply with attachments, thread view, trash, storage usage
//! and a live chat room.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questmail=debug,questmail_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    debug!("starting questmail");
    commands::run(cli).await
}
