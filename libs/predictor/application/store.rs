//! Prediction store
//!
//! Holds at most one record per target game. A new prediction for a target
//! whose record is already settled (the feed restarts its numbering) moves the
//! settled record to history instead of overwriting it.

use super::extractor::TextExtractor;
use super::verification::{Step, VerificationWindow};
use crate::domain::{GameId, MessageFormat, MessageHandle, PredictionRecord, PredictionStatus};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("A pending prediction already targets game {0}")]
    DuplicateTarget(GameId),
}

/// A record that was just settled by a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub target: GameId,
    pub status: PredictionStatus,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct PredictionStore {
    records: BTreeMap<GameId, PredictionRecord>,
    history: Vec<PredictionRecord>,
    /// Where each target's announcement was posted, reported by the transport
    handles: HashMap<GameId, MessageHandle>,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self, target: GameId) -> bool {
        self.records
            .get(&target)
            .map(PredictionRecord::is_pending)
            .unwrap_or(false)
    }

    pub fn insert_pending(&mut self, record: PredictionRecord) -> Result<(), StoreError> {
        let target = record.target_game_id;
        if self.has_pending(target) {
            return Err(StoreError::DuplicateTarget(target));
        }

        if let Some(previous) = self.records.insert(target, record) {
            debug!("Archiving settled prediction for game {}", target);
            self.handles.remove(&target);
            self.history.push(previous);
        }
        Ok(())
    }

    pub fn get(&self, target: GameId) -> Option<&PredictionRecord> {
        self.records.get(&target)
    }

    /// Current records in ascending target order
    pub fn records(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.records.values()
    }

    pub fn history(&self) -> &[PredictionRecord] {
        &self.history
    }

    pub fn pending_count(&self) -> usize {
        self.records.values().filter(|r| r.is_pending()).count()
    }

    /// Offer a finished result for `game` to the pending records.
    ///
    /// Records are visited in ascending target order and the first one that
    /// resolves ends the scan, so one message settles at most one record.
    pub fn verify(
        &mut self,
        game: GameId,
        text: &str,
        extractor: &TextExtractor,
        window: &VerificationWindow,
        format: &MessageFormat,
        now: DateTime<Utc>,
    ) -> Option<Settled> {
        for record in self.records.values_mut().filter(|r| r.is_pending()) {
            let offset = game.offset_from(record.target_game_id);
            let outcome = record.predicted_outcome;

            match window.step(offset, || extractor.contains_outcome(text, outcome)) {
                Step::Skip => continue,
                Step::Wait => {
                    debug!(
                        "Game {} is +{} for prediction {} ({} not seen yet)",
                        game, offset, record.target_game_id, outcome
                    );
                    continue;
                }
                Step::Resolve(resolution) => {
                    if !record.resolve(resolution, format, now) {
                        continue;
                    }
                    info!(
                        "Prediction {} resolved {} at +{} by game {}",
                        record.target_game_id,
                        record.status.label(),
                        offset,
                        game
                    );
                    return Some(Settled {
                        target: record.target_game_id,
                        status: record.status,
                        text: record.rendered_text.clone(),
                    });
                }
            }
        }

        None
    }

    pub fn attach_handle(&mut self, target: GameId, handle: MessageHandle) {
        self.handles.insert(target, handle);
    }

    pub fn handle_for(&self, target: GameId) -> Option<MessageHandle> {
        self.handles.get(&target).copied()
    }

    /// Drop every record, archived record and handle
    pub fn clear(&mut self) {
        self.records.clear();
        self.history.clear();
        self.handles.clear();
    }
}
