//! Domain Layer
//!
//! Pure value types of the prediction feed.
//! This layer has no dependencies on infrastructure or application layers.

pub mod card;
pub mod game;
pub mod prediction;

pub use card::{normalize_suits, Suit};
pub use game::{ChatId, GameId, MessageHandle};
pub use prediction::{MessageFormat, PredictionRecord, PredictionStatus, Resolution};
