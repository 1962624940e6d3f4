//! Flattening of webhook updates into what the bot acts on

use crate::types::Update;
use predictor::{ChatId, InboundEvent};

/// A text-bearing message from any update kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub update_id: i64,
    /// Chat the message arrived in; replies go here
    pub chat_id: ChatId,
    /// Chat the message speaks for: `sender_chat` when set, else `chat_id`
    pub source_chat_id: ChatId,
    pub chat_kind: String,
    pub message_id: i64,
    /// `None` for channel posts
    pub sender_id: Option<i64>,
    pub text: String,
    pub is_edit: bool,
}

impl Incoming {
    /// Slash commands are handled by the bot, never by the engine
    pub fn is_command(&self) -> bool {
        self.text.trim_start().starts_with('/')
    }

    pub fn to_event(&self) -> InboundEvent {
        InboundEvent::new(self.source_chat_id, self.text.clone(), self.is_edit)
    }
}

impl Update {
    /// Text (or caption) of the update's message, if any
    pub fn into_incoming(self) -> Option<Incoming> {
        let update_id = self.update_id;
        let (message, is_edit) = match (
            self.message,
            self.channel_post,
            self.edited_message,
            self.edited_channel_post,
        ) {
            (Some(m), _, _, _) | (_, Some(m), _, _) => (m, false),
            (_, _, Some(m), _) | (_, _, _, Some(m)) => (m, true),
            _ => return None,
        };

        let text = message.text.or(message.caption)?;
        let source_chat_id = message.sender_chat.map_or(message.chat.id, |chat| chat.id);

        Some(Incoming {
            update_id,
            chat_id: message.chat.id,
            source_chat_id,
            chat_kind: message.chat.kind,
            message_id: message.message_id,
            sender_id: message.from.map(|u| u.id),
            text,
            is_edit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_edited_channel_post() {
        let incoming = update(
            r##"{"update_id": 5, "edited_channel_post": {
                "message_id": 9, "chat": {"id": -100, "type": "channel"},
                "text": "#n100 ✅(10♦️)"}}"##,
        )
        .into_incoming()
        .unwrap();

        assert!(incoming.is_edit);
        assert_eq!(incoming.sender_id, None);
        assert_eq!(incoming.to_event(), InboundEvent::new(-100, "#n100 ✅(10♦️)", true));
    }

    #[test]
    fn test_private_command() {
        let incoming = update(
            r##"{"update_id": 6, "message": {
                "message_id": 1, "chat": {"id": 42, "type": "private"},
                "from": {"id": 42, "is_bot": false, "first_name": "Op"},
                "text": "/cooldown 60"}}"##,
        )
        .into_incoming()
        .unwrap();

        assert!(!incoming.is_edit);
        assert!(incoming.is_command());
        assert_eq!(incoming.sender_id, Some(42));
    }

    #[test]
    fn test_caption_is_used_when_text_missing() {
        let incoming = update(
            r##"{"update_id": 7, "channel_post": {
                "message_id": 2, "chat": {"id": -100, "type": "channel"},
                "caption": "#n7 ✅(A♠️)"}}"##,
        )
        .into_incoming()
        .unwrap();
        assert_eq!(incoming.text, "#n7 ✅(A♠️)");
    }

    #[test]
    fn test_forwarded_feed_post_speaks_for_the_channel() {
        let incoming = update(
            r##"{"update_id": 10, "message": {
                "message_id": 4, "chat": {"id": -100888, "type": "supergroup"},
                "sender_chat": {"id": -100, "type": "channel"},
                "text": "#n100 ✅(10♦️)"}}"##,
        )
        .into_incoming()
        .unwrap();

        assert_eq!(incoming.chat_id, -100888);
        assert_eq!(incoming.source_chat_id, -100);
        assert_eq!(incoming.to_event().source_channel_id, -100);
    }

    #[test]
    fn test_update_without_text() {
        let no_text = update(
            r##"{"update_id": 8, "message": {"message_id": 3, "chat": {"id": 1, "type": "private"}}}"##,
        );
        assert!(no_text.into_incoming().is_none());
        assert!(update(r##"{"update_id": 9}"##).into_incoming().is_none());
    }
}
