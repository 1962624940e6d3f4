//! Shared helpers for engine integration tests

use chrono::{TimeZone, Utc};
use predictor::{
    EngineConfig, EngineEffect, InboundEvent, ManualClock, MemoryTimestampStore, PredictionEngine,
};
use std::sync::Arc;

pub const SOURCE: i64 = -1002682552255;

pub fn engine(config: &EngineConfig) -> (PredictionEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    let engine = PredictionEngine::from_config(
        config,
        Box::new(MemoryTimestampStore::default()),
        clock.clone(),
    )
    .unwrap();
    (engine, clock)
}

pub fn feed(engine: &mut PredictionEngine, text: &str) -> Vec<EngineEffect> {
    engine.process(&InboundEvent::new(SOURCE, text, false))
}

pub fn announces(effects: &[EngineEffect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, EngineEffect::Announce { .. }))
        .count()
}

pub fn edits(effects: &[EngineEffect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, EngineEffect::Edit { .. }))
        .count()
}
