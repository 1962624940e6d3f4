//! Application Layer
//!
//! Extraction, rules, gating and verification, plus the engine that owns
//! them. Depends on the domain and infrastructure layers.

pub mod cooldown;
pub mod dedup;
pub mod engine;
pub mod extractor;
pub mod redirect;
pub mod rules;
pub mod store;
pub mod verification;

pub use cooldown::CooldownGate;
pub use dedup::{Fingerprint, SeenMessageSet};
pub use engine::{EngineEffect, EngineError, EngineSummary, InboundEvent, PredictionEngine};
pub use extractor::{first_group, TextExtractor};
pub use redirect::RedirectMap;
pub use rules::{RuleError, RuleTable, Signal, SignalRule, SignalToken};
pub use store::{PredictionStore, Settled, StoreError};
pub use verification::{Step, VerificationWindow};
