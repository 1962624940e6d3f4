//! Outbound seam between the bot and the chat transport

use crate::client::TelegramClient;
use crate::error::Result;
use async_trait::async_trait;
use predictor::{ChatId, MessageHandle};

/// Anything that can post and rewrite chat messages
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Post `text` and return where it landed
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageHandle>;

    async fn edit_text(&self, handle: MessageHandle, text: &str) -> Result<()>;
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageHandle> {
        let message = self.send_message(chat_id, text).await?;
        Ok(MessageHandle::new(message.chat.id, message.message_id))
    }

    async fn edit_text(&self, handle: MessageHandle, text: &str) -> Result<()> {
        self.edit_message_text(handle.chat_id, handle.message_id, text)
            .await
    }
}
