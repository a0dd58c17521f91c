//! Interactive chat command.
//!
//! Joins the room, streams inbound messages and presence changes, and
//! sends each typed line. `/who` prints the room, `/quit` leaves; so
//! does end-of-input or Ctrl-C, the terminal analog of closing the tab.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use questmail_core::{ChatContext, chat};
use questmail_realtime::RealtimeClient;

use crate::cli::ChatArgs;
use crate::commands::account;
use crate::output;

/// Runs one interactive chat session.
pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let (config, sessions) = account::sign_in(&args.credentials).await?;
    let session = sessions.require()?;
    let ctx = ChatContext::new(&config.chat, session.user.clone())?;
    let realtime = RealtimeClient::connect(&config.chat.url, &config.chat.key).await?;

    let (mut room, mut feeds) = chat::enter(&ctx, &realtime).await?;
    if let Some(error) = room.error() {
        eprintln!("{error}");
    }
    for message in room.messages() {
        output::print_chat_message(message);
    }
    output::print_online(room.online_users());
    println!("Type to send; /who lists the room, /quit leaves");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(text)) if text.trim() == "/quit" => break,
                    Ok(Some(text)) if text.trim() == "/who" => {
                        output::print_online(room.online_users());
                        output::print_typing(&room.typing_names(ctx.user_id()));
                    }
                    Ok(Some(text)) => {
                        // A submitted line is this client's editing activity;
                        // the flag is local state, never broadcast.
                        if !text.trim().is_empty() {
                            room.set_typing(ctx.user_id(), true);
                        }
                        if let Err(e) = chat::send_message(&ctx, &text).await {
                            eprintln!("{e}");
                        }
                        room.set_typing(ctx.user_id(), false);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
            event = feeds.messages.next_event() => {
                let Some(event) = event else {
                    warn!("message feed closed");
                    break;
                };
                if room.apply_message_event(&event)
                    && let Some(message) = room.messages().last()
                {
                    output::print_chat_message(message);
                }
            }
            event = feeds.presence.next_event() => {
                if event.is_none() {
                    warn!("presence feed closed");
                    break;
                }
                chat::refresh_online(&ctx, &mut room).await;
                output::print_online(room.online_users());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    chat::leave(&ctx, &mut room, feeds).await;
    Ok(())
}
