//! Shared fixtures for bot integration tests

use async_trait::async_trait;
use parking_lot::Mutex;
use predictor::{
    BotConfig, ChatId, Clock, ManualClock, MemoryTimestampStore, MessageHandle, PredictionEngine,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use telegram::{MessageSender, TelegramError, Update};

pub const SOURCE: ChatId = -1002682552255;
pub const PREDICTIONS: ChatId = -1002875505624;
pub const ADMIN: i64 = 42;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { chat_id: ChatId, text: String },
    Edit { handle: MessageHandle, text: String },
}

/// Records outbound calls; sends can be made to fail
#[derive(Default)]
pub struct MockSender {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_sends: AtomicBool,
    next_id: AtomicI64,
}

impl MockSender {
    pub fn messages_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Message { chat_id: c, text } if *c == chat_id => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(MessageHandle, String)> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Edit { handle, text } => Some((*handle, text.clone())),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> telegram::Result<MessageHandle> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TelegramError::ApiError {
                code: Some(403),
                description: "Forbidden: bot is not a member of the channel chat".to_string(),
            });
        }
        self.sent.lock().push(Sent::Message {
            chat_id,
            text: text.to_string(),
        });
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1000;
        Ok(MessageHandle::new(chat_id, id))
    }

    async fn edit_text(&self, handle: MessageHandle, text: &str) -> telegram::Result<()> {
        self.sent.lock().push(Sent::Edit {
            handle,
            text: text.to_string(),
        });
        Ok(())
    }
}

pub fn config() -> BotConfig {
    let mut config = BotConfig::default();
    config.telegram.admin_id = ADMIN;
    config
}

pub struct Harness {
    pub dispatcher: bot::Dispatcher,
    pub sender: Arc<MockSender>,
    pub engine: bot::SharedEngine,
    pub clock: Arc<ManualClock>,
}

pub fn harness(config: &BotConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let engine = PredictionEngine::from_config(
        &config.engine,
        Box::new(MemoryTimestampStore::default()),
        clock.clone(),
    )
    .unwrap();
    let engine = Arc::new(Mutex::new(engine));
    let sender = Arc::new(MockSender::default());

    let clock_dyn: Arc<dyn Clock> = clock.clone();
    let dispatcher = bot::Dispatcher::new(engine.clone(), sender.clone(), config, clock_dyn)
        .with_bot_username("pred_bot");

    Harness {
        dispatcher,
        sender,
        engine,
        clock,
    }
}

fn update(update_id: i64, kind: &str, message: Value) -> Update {
    serde_json::from_value(json!({ "update_id": update_id, kind: message })).unwrap()
}

pub fn channel_post(update_id: i64, chat_id: ChatId, text: &str, edited: bool) -> Update {
    let kind = if edited { "edited_channel_post" } else { "channel_post" };
    update(
        update_id,
        kind,
        json!({
            "message_id": update_id,
            "chat": {"id": chat_id, "type": "channel"},
            "date": 0,
            "text": text
        }),
    )
}

pub fn private_message(update_id: i64, user_id: i64, text: &str) -> Update {
    update(
        update_id,
        "message",
        json!({
            "message_id": update_id,
            "chat": {"id": user_id, "type": "private"},
            "from": {"id": user_id, "is_bot": false, "first_name": "Op"},
            "date": 0,
            "text": text
        }),
    )
}

pub fn group_message(update_id: i64, chat_id: ChatId, user_id: i64, text: &str) -> Update {
    update(
        update_id,
        "message",
        json!({
            "message_id": update_id,
            "chat": {"id": chat_id, "type": "supergroup", "title": "Ops"},
            "from": {"id": user_id, "is_bot": false, "first_name": "Op"},
            "date": 0,
            "text": text
        }),
    )
}

/// A feed post auto-forwarded into the channel's linked discussion group
pub fn forwarded_post(update_id: i64, group_id: ChatId, channel_id: ChatId, text: &str) -> Update {
    update(
        update_id,
        "message",
        json!({
            "message_id": update_id,
            "chat": {"id": group_id, "type": "supergroup", "title": "Discussion"},
            "sender_chat": {"id": channel_id, "type": "channel"},
            "date": 0,
            "text": text
        }),
    )
}
