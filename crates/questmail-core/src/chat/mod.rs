//! Chat domain: models, live session state and services.

mod model;
mod service;
mod session;

pub use model::{CHAT_HISTORY_LIMIT, ChatError, ChatMessage, ChatResult, NewChatMessage, OnlineUser};
pub use service::{
    ChatFeeds, delete_presence, enter, fetch_online_users, leave, load_recent_messages,
    refresh_online, send_message, upsert_presence,
};
pub use session::{ChatPhase, ChatSession};
