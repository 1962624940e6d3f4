//! Bot API HTTP client

use crate::error::{Result, TelegramError};
use crate::types::{ApiResponse, Message, User};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Updates the webhook subscribes to
pub const ALLOWED_UPDATES: &[&str] = &[
    "message",
    "edited_message",
    "channel_post",
    "edited_channel_post",
];

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
    allowed_updates: &'a [&'a str],
    drop_pending_updates: bool,
}

#[derive(Debug, Serialize)]
struct EmptyRequest {}

/// Bot API client
///
/// The token is part of every request URL, so request errors are stripped of
/// their URL before they are returned.
pub struct TelegramClient {
    endpoint: String,
    client: Client,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("endpoint", &"<redacted>")
            .finish()
    }
}

fn request_error(e: reqwest::Error) -> TelegramError {
    TelegramError::RequestFailed(e.without_url())
}

/// Bot tokens look like `<bot id>:<secret>`
pub fn is_valid_token(token: &str) -> bool {
    let mut parts = token.split(':');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(id), Some(secret), None) if !id.is_empty() && !secret.is_empty()
    )
}

impl TelegramClient {
    pub fn new(api_base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        if !is_valid_token(token) {
            return Err(TelegramError::InvalidToken);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(request_error)?;

        Ok(Self {
            endpoint: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
            client,
        })
    }

    async fn call<P, T>(&self, method: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.endpoint, method);

        debug!("Calling Bot API method {}", method);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(request_error)?;

        // Error bodies carry the description, so parse regardless of status
        let status = response.status();
        let body: ApiResponse<T> = response.json().await.map_err(|e| {
            TelegramError::ParseError(format!("{} (HTTP {})", e.without_url(), status))
        })?;

        if !body.ok {
            return Err(TelegramError::ApiError {
                code: body.error_code,
                description: body
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }

        body.result
            .ok_or_else(|| TelegramError::ParseError(format!("{} returned no result", method)))
    }

    /// Post an HTML-formatted message
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let message: Message = self.call("sendMessage", &request).await?;
        debug!("Sent message {} to chat {}", message.message_id, chat_id);
        Ok(message)
    }

    /// Replace a message's text. Telegram's "message is not modified"
    /// answer counts as success.
    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let request = EditMessageTextRequest {
            chat_id,
            message_id,
            text,
            parse_mode: "HTML",
        };

        match self.call::<_, serde_json::Value>("editMessageText", &request).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_modified() => {
                debug!("Message {} in chat {} already up to date", message_id, chat_id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Point Telegram at `url` for update delivery
    pub async fn set_webhook(&self, url: &str) -> Result<()> {
        let request = SetWebhookRequest {
            url,
            allowed_updates: ALLOWED_UPDATES,
            drop_pending_updates: false,
        };

        let _: bool = self.call("setWebhook", &request).await?;
        Ok(())
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &EmptyRequest {}).await
    }
}
