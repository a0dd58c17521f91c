//! Terminal rendering for listings, threads, chat and the storage gauge.
//!
//! Addresses render through [`display_address`], which replaces the `@`
//! of the questmail domain with `?`.

use chrono::{DateTime, Utc};

use questmail_core::mail::display_address;
use questmail_core::{ChatMessage, Folder, MailSummary, OnlineUser, StorageUsage, Thread};

/// Prints one folder listing, newest first. Unread mail is starred.
pub fn print_mail_list(folder: Folder, summaries: &[MailSummary]) {
    if summaries.is_empty() {
        println!("{folder} is empty");
        return;
    }
    for summary in summaries {
        let mail = &summary.mail;
        let marker = if mail.read { ' ' } else { '*' };
        println!(
            "{} {} {} {:<24} {}",
            mail.id,
            marker,
            format_time(mail.created_at),
            display_address(summary.counterpart(folder)),
            mail.subject,
        );
    }
}

/// Prints a resolved thread, oldest message first.
pub fn print_thread(thread: &Thread) {
    for message in &thread.messages {
        let mail = &message.mail;
        println!("From: {}", display_address(&message.sender_email));
        println!("Date: {}", format_time(mail.created_at));
        println!("Subject: {}", mail.subject);
        if mail.onetime {
            println!("This mail self-destructs when closed");
        }
        println!();
        println!("{}", mail.body);
        for attachment in &message.attachments {
            println!(
                "  [{}] {} {}",
                format_size(attachment.size_bytes),
                attachment.file_name(),
                attachment.file_url,
            );
        }
        println!("---");
    }
}

/// Prints the storage gauge and its coarse label.
pub fn print_storage(usage: StorageUsage) {
    println!(
        "{} of 100MB used ({:.1}%)",
        format_size(usage.used_bytes),
        usage.percent(),
    );
    println!("{}", usage.label());
}

/// Prints one chat message.
pub fn print_chat_message(message: &ChatMessage) {
    println!(
        "[{}] {}: {}",
        message.created_at.format("%H:%M"),
        message.username,
        message.message,
    );
}

/// Prints the room's presence list on one line.
pub fn print_online(users: &[OnlineUser]) {
    if users.is_empty() {
        println!("Nobody else is online");
        return;
    }
    let names: Vec<&str> = users.iter().map(|user| user.username.as_str()).collect();
    println!("Online ({}): {}", users.len(), names.join(", "));
}

/// Prints the typing indicator; silent when nobody else is typing.
pub fn print_typing(names: &[String]) {
    if let Some(line) = typing_line(names) {
        println!("{line}");
    }
}

fn typing_line(names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    Some(format!("{} is typing...", names.join(", ")))
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1}KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes}B")
    }
}
