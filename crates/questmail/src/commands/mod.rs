//! Command handlers.

mod account;
mod chat;
mod compose;
mod mailbox;
mod storage;
mod thread;

use crate::cli::{Cli, Command};

/// Dispatches one parsed invocation.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Signup(args) => account::signup(args).await,
        Command::Whoami(args) => account::whoami(args).await,
        Command::List(args) => mailbox::list(args).await,
        Command::Send(args) => compose::send(args).await,
        Command::Open(args) => thread::open(args).await,
        Command::Reply(args) => thread::reply(args).await,
        Command::Delete(args) => mailbox::delete(args).await,
        Command::ClearTrash(args) => mailbox::clear_trash(args).await,
        Command::Storage(args) => storage::show(args).await,
        Command::Chat(args) => chat::run(args).await,
    }
}
