//! Cooldown gate: paces accepted predictions and rejects replayed messages

use super::dedup::{Fingerprint, SeenMessageSet};
use crate::infrastructure::persistence::TimestampStore;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

pub struct CooldownGate {
    last_prediction_time: Option<DateTime<Utc>>,
    cooldown: Duration,
    store: Box<dyn TimestampStore>,
    seen: SeenMessageSet,
}

impl CooldownGate {
    /// Build the gate, restoring the last prediction time from `store`.
    ///
    /// A store that cannot be read is treated as empty.
    pub fn new(cooldown: Duration, store: Box<dyn TimestampStore>, seen: SeenMessageSet) -> Self {
        let last_prediction_time = match store.load() {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not load last prediction time, starting without cooldown: {}", e);
                None
            }
        };

        if let Some(at) = last_prediction_time {
            debug!("Restored last prediction time {}", at);
        }

        Self {
            last_prediction_time,
            cooldown,
            store,
            seen,
        }
    }

    /// True if no prediction was ever accepted or the cooldown has elapsed
    pub fn may_predict(&self, now: DateTime<Utc>) -> bool {
        match self.last_prediction_time {
            None => true,
            Some(last) => now.signed_duration_since(last) >= self.cooldown,
        }
    }

    /// Time left before the next prediction may be accepted
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_prediction_time?;
        let left = self.cooldown - now.signed_duration_since(last);
        (left > Duration::zero()).then_some(left)
    }

    /// Remember an accepted prediction; a failed write only costs the
    /// cross-restart memory
    pub fn record_prediction(&mut self, now: DateTime<Utc>) {
        self.last_prediction_time = Some(now);
        if let Err(e) = self.store.save(now) {
            warn!("Could not persist last prediction time, keeping it in memory: {}", e);
        }
    }

    pub fn is_duplicate(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> bool {
        self.seen.contains(fingerprint, now)
    }

    pub fn mark_seen(&mut self, fingerprint: Fingerprint, now: DateTime<Utc>) {
        self.seen.insert(fingerprint, now);
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    pub fn last_prediction_time(&self) -> Option<DateTime<Utc>> {
        self.last_prediction_time
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Forget every fingerprint; the last prediction time is kept
    pub fn clear_seen(&mut self) {
        self.seen.clear();
    }
}
