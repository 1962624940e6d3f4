//! Prediction records and their lifecycle
//!
//! A record is created `Pending` and resolves exactly once, to `Correct` or
//! `Failed`. The transition table lives in [`PredictionStatus::apply`]; any
//! attempt to move a resolved record again is refused there.

use super::card::Suit;
use super::game::GameId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hourglass shown while a prediction waits for its target game
pub const PENDING_GLYPH: &str = "⏳";
/// Shown once a prediction is confirmed, followed by the keycap offset
pub const SUCCESS_GLYPH: &str = "✅";
/// Combining sequence that turns a digit into a keycap emoji (`0️⃣`)
const KEYCAP_SUFFIX: &str = "\u{FE0F}\u{20E3}";

/// Status of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionStatus {
    Pending,
    Correct { offset: u64 },
    Failed { offset: u64 },
}

/// Outcome of one verification step that closes a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Correct { offset: u64 },
    Failed { offset: u64 },
}

impl PredictionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, PredictionStatus::Pending)
    }

    /// Offset at which the record resolved
    pub fn resolved_offset(&self) -> Option<u64> {
        match self {
            PredictionStatus::Pending => None,
            PredictionStatus::Correct { offset } | PredictionStatus::Failed { offset } => {
                Some(*offset)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PredictionStatus::Pending => "pending",
            PredictionStatus::Correct { .. } => "correct",
            PredictionStatus::Failed { .. } => "failed",
        }
    }

    /// Status after `resolution`, or `None` if the transition is not allowed
    pub fn apply(self, resolution: Resolution) -> Option<PredictionStatus> {
        match (self, resolution) {
            (PredictionStatus::Pending, Resolution::Correct { offset }) => {
                Some(PredictionStatus::Correct { offset })
            }
            (PredictionStatus::Pending, Resolution::Failed { offset }) => {
                Some(PredictionStatus::Failed { offset })
            }
            (PredictionStatus::Correct { .. }, _) | (PredictionStatus::Failed { .. }, _) => None,
        }
    }
}

/// Text layout of prediction messages.
///
/// `{marker}{target}{marker}:{outcome}statut :{status}`; the channel's
/// readers and any tooling scraping it rely on this exact shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFormat {
    pub marker: String,
    pub failure_glyph: String,
}

impl Default for MessageFormat {
    fn default() -> Self {
        Self {
            marker: "🔵".to_string(),
            failure_glyph: "❌".to_string(),
        }
    }
}

impl MessageFormat {
    pub fn new(marker: impl Into<String>, failure_glyph: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            failure_glyph: failure_glyph.into(),
        }
    }

    pub fn status_glyph(&self, status: PredictionStatus) -> String {
        match status {
            PredictionStatus::Pending => PENDING_GLYPH.to_string(),
            PredictionStatus::Correct { offset } => {
                format!("{}{}{}", SUCCESS_GLYPH, offset, KEYCAP_SUFFIX)
            }
            PredictionStatus::Failed { .. } => self.failure_glyph.clone(),
        }
    }

    pub fn render(&self, target: GameId, outcome: Suit, status: PredictionStatus) -> String {
        format!(
            "{marker}{target}{marker}:{outcome}statut :{status}",
            marker = self.marker,
            target = target,
            outcome = outcome,
            status = self.status_glyph(status),
        )
    }
}

/// One outstanding or settled prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub target_game_id: GameId,
    pub source_game_id: GameId,
    pub predicted_outcome: Suit,
    /// Signal token that triggered the prediction
    pub signal: String,
    pub status: PredictionStatus,
    pub rendered_text: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PredictionRecord {
    pub fn pending(
        source_game_id: GameId,
        target_game_id: GameId,
        signal: impl Into<String>,
        predicted_outcome: Suit,
        created_at: DateTime<Utc>,
        format: &MessageFormat,
    ) -> Self {
        let status = PredictionStatus::Pending;
        Self {
            target_game_id,
            source_game_id,
            predicted_outcome,
            signal: signal.into(),
            status,
            rendered_text: format.render(target_game_id, predicted_outcome, status),
            created_at,
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    pub fn resolved_offset(&self) -> Option<u64> {
        self.status.resolved_offset()
    }

    /// Close the record and re-render its text.
    ///
    /// Returns `false` and leaves the record untouched if it was already
    /// resolved.
    pub fn resolve(
        &mut self,
        resolution: Resolution,
        format: &MessageFormat,
        now: DateTime<Utc>,
    ) -> bool {
        match self.status.apply(resolution) {
            Some(next) => {
                self.status = next;
                self.rendered_text = format.render(self.target_game_id, self.predicted_outcome, next);
                self.resolved_at = Some(now);
                true
            }
            None => false,
        }
    }
}
