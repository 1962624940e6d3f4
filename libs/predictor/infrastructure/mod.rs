//! Infrastructure Layer
//!
//! Implementations of external concerns (config files, disk, wall clock,
//! process signals). Depends on the domain layer, never on the application
//! layer.

pub mod clock;
pub mod config;
pub mod heartbeat;
pub mod logging;
pub mod persistence;
pub mod shutdown;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    BotConfig, ConfigError, EngineConfig, RuleEntry, ServerConfig, SignalRuleConfig,
    TelegramConfig,
};
pub use heartbeat::Heartbeat;
pub use logging::{init_tracing, init_tracing_with_level};
pub use persistence::{FileTimestampStore, MemoryTimestampStore, PersistenceError, TimestampStore};
pub use shutdown::ShutdownManager;
