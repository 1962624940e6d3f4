//! Card Prediction Engine
//!
//! Turns a live feed of finished card-game results into suit predictions and
//! tracks each prediction until a later game confirms or refutes it.
//!
//! ## Layers
//!
//! - **domain**: suits, game ids, prediction records and their rendering
//! - **application**: extraction, signal rules, cooldown gate, verification
//!   state machine, redirects and the engine that ties them together
//! - **infrastructure**: configuration, logging, persistence, clock, shutdown

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    CooldownGate, EngineEffect, EngineError, EngineSummary, InboundEvent, PredictionEngine,
    PredictionStore, RedirectMap, RuleTable, SignalRule, TextExtractor, VerificationWindow,
};
pub use domain::{
    ChatId, GameId, MessageFormat, MessageHandle, PredictionRecord, PredictionStatus, Suit,
};
pub use infrastructure::{
    init_tracing, init_tracing_with_level, BotConfig, Clock, ConfigError, EngineConfig,
    FileTimestampStore, Heartbeat, ManualClock, MemoryTimestampStore, ShutdownManager,
    SystemClock, TimestampStore,
};
