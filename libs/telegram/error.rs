use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {description}")]
    ApiError {
        code: Option<i32>,
        description: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid bot token")]
    InvalidToken,
}

impl TelegramError {
    /// The edit would leave the message unchanged
    pub fn is_not_modified(&self) -> bool {
        matches!(self, TelegramError::ApiError { description, .. }
            if description.contains("message is not modified"))
    }
}

pub type Result<T> = std::result::Result<T, TelegramError>;
