pub mod engine;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub use engine::{default_rules, EngineConfig, RuleEntry, SignalRuleConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between status lines of the running bot
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Bot API token from .env (not in YAML)
    #[serde(skip)]
    pub bot_token: String,

    /// Public base URL of this service from .env (not in YAML)
    #[serde(skip)]
    pub webhook_url: Option<String>,

    /// Authorize every user for operator commands (DEBUG_MODE)
    #[serde(skip)]
    pub debug_mode: bool,
}

/// Webhook HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Overridden by PORT
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Updates buffered between the HTTP handler and the dispatcher
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Bot API and operator command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Operator allowed to run commands; overridden by ADMIN_ID.
    /// 0 means no operator: commands are refused unless DEBUG_MODE is on.
    #[serde(default)]
    pub admin_id: i64,

    /// Private-chat messages allowed per user per window
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max_messages: usize,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_heartbeat_interval() -> u64 {
    300 // 5 minutes
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_rate_limit_max() -> usize {
    30
}

fn default_rate_limit_window() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_path: default_webhook_path(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            admin_id: 0,
            rate_limit_max_messages: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            engine: EngineConfig::default(),
            server: ServerConfig::default(),
            telegram: TelegramConfig::default(),
            bot_token: String::new(),
            webhook_url: None,
            debug_mode: false,
        }
    }
}

impl BotConfig {
    /// Load configuration from YAML file and the environment (.env included)
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::load_file(config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Load only the YAML part; a missing file yields the stock configuration
    pub fn load_file(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();
        if !path.exists() {
            warn!("Config file {:?} not found, using built-in defaults", path);
            return Ok(Self::default());
        }

        let yaml_content = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml_content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.bot_token = lookup("BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::EnvVarMissing("BOT_TOKEN".to_string()))?;

        self.webhook_url = lookup("WEBHOOK_URL").filter(|url| !url.trim().is_empty());

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("PORT is not a valid port: {}", port)))?;
        }

        if let Some(admin) = lookup("ADMIN_ID") {
            self.telegram.admin_id = admin
                .trim()
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("ADMIN_ID is not a number: {}", admin)))?;
        }

        if let Some(debug) = lookup("DEBUG_MODE") {
            self.debug_mode = debug.trim().eq_ignore_ascii_case("true");
        }

        Ok(())
    }

    /// Validate configuration values
    /// Whether anyone can run operator commands
    pub fn has_operator(&self) -> bool {
        self.debug_mode || self.telegram.admin_id != 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.split(':').count() != 2 {
            return Err(ConfigError::ValidationError(
                "Invalid bot token format".to_string(),
            ));
        }

        if let Some(url) = &self.webhook_url {
            if !url.starts_with("https://") {
                warn!("Webhook URL should use HTTPS for production");
            }
        }

        if !self.has_operator() {
            warn!("ADMIN_ID is not set, operator commands are disabled");
        }

        if !self.server.webhook_path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "server.webhook_path must start with '/'".to_string(),
            ));
        }

        if self.server.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "server.queue_capacity must be greater than 0".to_string(),
            ));
        }

        if self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "heartbeat_interval_secs must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(
                format!("log_level must be one of: {}", valid_levels.join(", ")),
            ));
        }

        self.engine.validate()
    }

    /// Full URL Telegram should post updates to, if a public URL is configured
    pub fn webhook_endpoint(&self) -> Option<String> {
        self.webhook_url
            .as_ref()
            .map(|url| format!("{}{}", url.trim_end_matches('/'), self.server.webhook_path))
    }

    /// Log configuration summary (without secrets)
    pub fn log(&self) {
        let bot_id = self.bot_token.split(':').next().unwrap_or_default();
        info!("Configuration loaded:");
        info!("  Bot id: {}", bot_id);
        info!("  Webhook: {}", self.webhook_endpoint().as_deref().unwrap_or("not configured"));
        info!("  Listen: {}:{}", self.server.host, self.server.port);
        info!("  Log level: {}", self.log_level);
        info!("  Debug mode: {}", self.debug_mode);
        self.engine.log();
    }
}
