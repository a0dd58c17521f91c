//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use questmail_core::Folder;

/// Terminal webmail and chat client for the `QuestMail` platform.
#[derive(Debug, Parser)]
#[command(name = "questmail", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new account; signs in when the service allows it
    Signup(SignupArgs),
    /// Print the signed-in account
    Whoami(WhoamiArgs),
    /// List a mail folder
    List(ListArgs),
    /// Send a new mail
    Send(SendArgs),
    /// Open a mail and its thread, marking it read
    Open(OpenArgs),
    /// Reply within a mail's thread
    Reply(ReplyArgs),
    /// Delete a mail with the viewed folder's semantics
    Delete(DeleteArgs),
    /// Permanently empty the trash folder
    ClearTrash(ClearTrashArgs),
    /// Show attachment storage usage against the quota
    Storage(StorageArgs),
    /// Join the live chat room
    Chat(ChatArgs),
}

/// Account credentials shared by every command.
///
/// Flags override the `QUESTMAIL_USER` / `QUESTMAIL_PASS` environment
/// variables.
#[derive(Debug, Args)]
pub struct Credentials {
    /// Bare account username; the questmail domain is appended
    #[arg(long)]
    pub user: Option<String>,
    /// Account password
    #[arg(long)]
    pub pass: Option<String>,
}

/// Arguments for `signup`.
#[derive(Debug, Args)]
pub struct SignupArgs {
    #[command(flatten)]
    pub credentials: Credentials,
}

/// Arguments for `whoami`.
#[derive(Debug, Args)]
pub struct WhoamiArgs {
    #[command(flatten)]
    pub credentials: Credentials,
}

/// Arguments for `list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    /// Folder to list
    #[arg(value_enum, default_value_t = FolderArg::Inbox)]
    pub folder: FolderArg,
    /// Keep only mail matching this text in subject, body or addresses
    #[arg(long)]
    pub search: Option<String>,
}

/// Arguments for `send`.
#[derive(Debug, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    /// Bare recipient username; the questmail domain is appended
    #[arg(long)]
    pub to: String,
    /// Subject line
    #[arg(long, default_value = "")]
    pub subject: String,
    /// Body text
    #[arg(long, default_value = "")]
    pub body: String,
    /// Send the body as HTML
    #[arg(long)]
    pub html: bool,
    /// Self-destruct when the reader closes the mail
    #[arg(long)]
    pub onetime: bool,
    /// Attach a file; repeat for more
    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
}

/// Arguments for `open`.
#[derive(Debug, Args)]
pub struct OpenArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    /// Mail id from a listing
    pub id: Uuid,
}

/// Arguments for `reply`.
#[derive(Debug, Args)]
pub struct ReplyArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    /// Mail id being replied to
    pub id: Uuid,
    /// Body text
    #[arg(long, default_value = "")]
    pub body: String,
    /// Send the body as HTML
    #[arg(long)]
    pub html: bool,
    /// Attach a file; repeat for more
    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
}

/// Arguments for `delete`.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    /// Mail id from a listing
    pub id: Uuid,
    /// Folder the mail was listed in; `sent` deletes permanently,
    /// everything else moves to trash
    #[arg(long, value_enum, default_value_t = FolderArg::Inbox)]
    pub folder: FolderArg,
}

/// Arguments for `clear-trash`.
#[derive(Debug, Args)]
pub struct ClearTrashArgs {
    #[command(flatten)]
    pub credentials: Credentials,
}

/// Arguments for `storage`.
#[derive(Debug, Args)]
pub struct StorageArgs {
    #[command(flatten)]
    pub credentials: Credentials,
}

/// Arguments for `chat`.
#[derive(Debug, Args)]
pub struct ChatArgs {
    #[command(flatten)]
    pub credentials: Credentials,
}

/// Folder names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FolderArg {
    /// Received mail
    Inbox,
    /// Mail the account sent
    Sent,
    /// Junk
    Spam,
    /// Soft-deleted mail
    Trash,
}

impl From<FolderArg> for Folder {
    fn from(folder: FolderArg) -> Self {
        match folder {
            FolderArg::Inbox => Self::Inbox,
            FolderArg::Sent => Self::Sent,
            FolderArg::Spam => Self::Spam,
            FolderArg::Trash => Self::Trash,
        }
    }
}
