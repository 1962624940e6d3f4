//! Bot API objects, limited to the fields the bot reads

use serde::{Deserialize, Serialize};

/// Envelope around every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,

    /// Missing `Option` fields decode as `None`
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

/// One webhook delivery. At most one of the payload fields is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_channel_post: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,

    pub chat: Chat,

    /// Empty for channel posts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,

    /// Channel a post was made on behalf of, e.g. a feed post forwarded
    /// into its linked discussion group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,

    #[serde(default)]
    pub date: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub is_bot: bool,

    #[serde(default)]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_channel_post() {
        let json = r##"{
            "update_id": 10,
            "channel_post": {
                "message_id": 77,
                "chat": {"id": -1002682552255, "type": "channel", "title": "Feed"},
                "date": 1714560000,
                "text": "#n100 ✅3(10♦️ 4♣️) - 2(J♥️ 8♠️)"
            }
        }"##;

        let update: Update = serde_json::from_str(json).unwrap();
        let post = update.channel_post.unwrap();
        assert_eq!(post.chat.id, -1002682552255);
        assert_eq!(post.chat.kind, "channel");
        assert!(post.from.is_none());
        assert!(update.message.is_none());
    }

    #[test]
    fn test_decode_error_response() {
        let json = r##"{"ok": false, "error_code": 400, "description": "Bad Request: message is not modified"}"##;
        let response: ApiResponse<Message> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.error_code, Some(400));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r##"{"update_id": 3, "poll": {"id": "x"}}"##;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 3);
    }
}
