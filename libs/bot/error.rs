use predictor::application::EngineError;
use predictor::ConfigError;
use telegram::TelegramError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine setup failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dispatcher task failed: {0}")]
    Dispatcher(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
