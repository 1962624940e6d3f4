//! Prediction bot service
//!
//! Wires the prediction engine to Telegram: an axum webhook receiver feeds a
//! single dispatcher task, which owns all engine mutations, runs operator
//! commands and performs the outbound sends and edits.

pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod messages;
pub mod rate_limit;
pub mod server;
pub mod service;

pub use commands::{Authorizer, Command, CommandError, RedirectArgs};
pub use dispatcher::{Dispatcher, SharedEngine};
pub use error::{Result, ServiceError};
pub use rate_limit::{RateDecision, RateLimiter};
pub use server::{router, AppState};
pub use service::BotService;
