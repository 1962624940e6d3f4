//! Telegram Bot API transport
//!
//! Thin client over the HTTP Bot API plus the update types the bot decodes
//! from webhook deliveries.

pub mod client;
pub mod error;
pub mod inbound;
pub mod sender;
pub mod types;

pub use client::TelegramClient;
pub use error::{Result, TelegramError};
pub use inbound::Incoming;
pub use sender::MessageSender;
pub use types::{ApiResponse, Chat, Message, Update, User};
