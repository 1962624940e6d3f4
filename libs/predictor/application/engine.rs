//! Prediction engine
//!
//! Single owner of all mutable prediction state. Callers feed it one inbound
//! message at a time and carry out the returned effects (send / edit) without
//! holding the engine, reporting sent message handles back through
//! [`PredictionEngine::register_handle`].

use super::cooldown::CooldownGate;
use super::dedup::{Fingerprint, SeenMessageSet};
use super::extractor::TextExtractor;
use super::redirect::RedirectMap;
use super::rules::{RuleError, SignalRule};
use super::store::PredictionStore;
use super::verification::VerificationWindow;
use crate::domain::{
    ChatId, GameId, MessageFormat, MessageHandle, PredictionRecord, PredictionStatus,
};
use crate::infrastructure::clock::Clock;
use crate::infrastructure::config::{ConfigError, EngineConfig};
use crate::infrastructure::persistence::TimestampStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid signal rule: {0}")]
    Rule(#[from] RuleError),
}

/// One message from the source feed, as decoded by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub source_channel_id: ChatId,
    pub text: String,
    pub is_edit: bool,
}

impl InboundEvent {
    pub fn new(source_channel_id: ChatId, text: impl Into<String>, is_edit: bool) -> Self {
        Self {
            source_channel_id,
            text: text.into(),
            is_edit,
        }
    }
}

/// Outbound work requested by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEffect {
    /// Post a new pending prediction and report its handle back
    Announce {
        target: GameId,
        destination: ChatId,
        text: String,
    },
    /// Rewrite a previously announced prediction with its final status.
    ///
    /// `handle` is `None` when the announcement never went out; the edit
    /// should then be skipped.
    Edit {
        target: GameId,
        handle: Option<MessageHandle>,
        status: PredictionStatus,
        text: String,
    },
}

/// Counters for status commands and heartbeat lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSummary {
    pub pending: usize,
    pub correct: usize,
    pub failed: usize,
    pub archived: usize,
    pub seen_messages: usize,
    pub cooldown_secs: i64,
    pub cooldown_remaining_secs: Option<i64>,
    pub last_prediction_time: Option<DateTime<Utc>>,
}

/// Largest span chrono accepts in whole seconds
const MAX_SECS: u64 = (i64::MAX / 1000) as u64;

pub fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_SECS) as i64)
}

pub struct PredictionEngine {
    extractor: TextExtractor,
    signal_rule: SignalRule,
    gate: CooldownGate,
    store: PredictionStore,
    window: VerificationWindow,
    redirects: RedirectMap,
    format: MessageFormat,
    clock: Arc<dyn Clock>,
    target_offset: u64,
    predict_from_edits_only: bool,
}

impl PredictionEngine {
    pub fn from_config(
        config: &EngineConfig,
        timestamps: Box<dyn TimestampStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let seen = SeenMessageSet::new(config.dedup_capacity, seconds(config.dedup_retention_secs));
        let gate = CooldownGate::new(seconds(config.cooldown_secs), timestamps, seen);

        Ok(Self {
            extractor: TextExtractor::new(config.completion_markers.clone()),
            signal_rule: SignalRule::from_config(&config.signal_rule)?,
            gate,
            store: PredictionStore::new(),
            window: VerificationWindow::from(config.max_offset),
            redirects: RedirectMap::new(config.prediction_channel_id),
            format: MessageFormat::new(config.prediction_marker.clone(), config.failure_glyph.clone()),
            clock,
            target_offset: config.target_offset,
            predict_from_edits_only: config.predict_from_edits_only,
        })
    }

    /// Run one message through prediction and verification.
    ///
    /// Both paths see the same message independently; each produces at most
    /// one effect.
    pub fn process(&mut self, event: &InboundEvent) -> Vec<EngineEffect> {
        let Some(game) = self.extractor.extract_game_id(&event.text) else {
            debug!("No game number in message, ignoring");
            return Vec::new();
        };

        if !self.extractor.has_completion_marker(&event.text) {
            debug!("Game #{} not finished yet (no completion marker)", game);
            return Vec::new();
        }

        let now = self.clock.now();
        let mut effects = Vec::with_capacity(2);

        if let Some(effect) = self.try_predict(game, event, now) {
            effects.push(effect);
        }
        if let Some(effect) = self.try_verify(game, &event.text, now) {
            effects.push(effect);
        }

        effects
    }

    fn try_predict(&mut self, game: GameId, event: &InboundEvent, now: DateTime<Utc>) -> Option<EngineEffect> {
        if self.predict_from_edits_only && !event.is_edit {
            debug!("Game #{}: new message, predictions only come from edits", game);
            return None;
        }

        let Some(signal) = self.signal_rule.detect(&self.extractor, &event.text) else {
            debug!("Game #{}: no signal in first group", game);
            return None;
        };

        if !self.gate.may_predict(now) {
            let left = self.gate.remaining(now).map(|d| d.num_seconds()).unwrap_or(0);
            warn!(
                "Game #{}: signal {} refused, cooldown active ({}s left of {}s)",
                game,
                signal.token,
                left,
                self.gate.cooldown().num_seconds()
            );
            return None;
        }

        let Some(target) = game.forward(self.target_offset) else {
            warn!("Game #{}: target game number overflows", game);
            return None;
        };

        if self.store.has_pending(target) {
            debug!("Game #{}: prediction for {} already pending", game, target);
            return None;
        }

        let fingerprint = Fingerprint::of(&event.text);
        if self.gate.is_duplicate(&fingerprint, now) {
            debug!("Game #{}: message {} already processed", game, fingerprint);
            return None;
        }

        let record = PredictionRecord::pending(
            game,
            target,
            signal.token.as_str(),
            signal.outcome,
            now,
            &self.format,
        );
        let text = record.rendered_text.clone();

        if let Err(e) = self.store.insert_pending(record) {
            warn!("Game #{}: {}", game, e);
            return None;
        }

        self.gate.mark_seen(fingerprint, now);
        self.gate.record_prediction(now);

        info!(
            "Prediction accepted: game {} signal {} → game {} {}",
            game, signal.token, target, signal.outcome
        );

        Some(EngineEffect::Announce {
            target,
            destination: self.redirects.get(event.source_channel_id),
            text,
        })
    }

    fn try_verify(&mut self, game: GameId, text: &str, now: DateTime<Utc>) -> Option<EngineEffect> {
        let settled = self
            .store
            .verify(game, text, &self.extractor, &self.window, &self.format, now)?;

        Some(EngineEffect::Edit {
            target: settled.target,
            handle: self.store.handle_for(settled.target),
            status: settled.status,
            text: settled.text,
        })
    }

    /// Remember where the announcement for `target` was posted
    pub fn register_handle(&mut self, target: GameId, handle: MessageHandle) {
        self.store.attach_handle(target, handle);
    }

    /// Clear predictions, handles and remembered messages.
    ///
    /// Redirects and the persisted cooldown timestamp are kept.
    pub fn reset(&mut self) {
        self.store.clear();
        self.gate.clear_seen();
        info!("All predictions reset");
    }

    pub fn cooldown(&self) -> Duration {
        self.gate.cooldown()
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        info!("Cooldown set to {}s", cooldown.num_seconds());
        self.gate.set_cooldown(cooldown);
    }

    pub fn redirects(&self) -> &RedirectMap {
        &self.redirects
    }

    pub fn redirects_mut(&mut self) -> &mut RedirectMap {
        &mut self.redirects
    }

    pub fn store(&self) -> &PredictionStore {
        &self.store
    }

    pub fn summary(&self) -> EngineSummary {
        let now = self.clock.now();
        let mut summary = EngineSummary {
            pending: 0,
            correct: 0,
            failed: 0,
            archived: self.store.history().len(),
            seen_messages: self.gate.seen_count(),
            cooldown_secs: self.gate.cooldown().num_seconds(),
            cooldown_remaining_secs: self.gate.remaining(now).map(|d| d.num_seconds()),
            last_prediction_time: self.gate.last_prediction_time(),
        };

        for record in self.store.records() {
            match record.status {
                PredictionStatus::Pending => summary.pending += 1,
                PredictionStatus::Correct { .. } => summary.correct += 1,
                PredictionStatus::Failed { .. } => summary.failed += 1,
            }
        }

        summary
    }
}
