//! Card Prediction Bot - Main Library
//!
//! Re-exports the workspace libraries and the helpers shared by binaries.
//!
//! ## Architecture
//!
//! - **bin_common**: configuration path resolution and the runner trait
//! - **predictor**: prediction engine (re-exported from workspace)
//! - **telegram**: Bot API transport (re-exported from workspace)
//! - **bot**: webhook service (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use card_prediction_bot::bin_common::{load_config_from_env, ConfigType};
//! use card_prediction_bot::bot::BotService;
//! ```

// Re-export workspace libraries for convenience
pub use bot;
pub use predictor;
pub use telegram;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, ConfigType};
    pub use runner::{BinaryRunner, RunConfig};
}
