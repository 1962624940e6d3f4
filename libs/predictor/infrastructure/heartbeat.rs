//! Heartbeat logging for the long-running bot

use super::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// One year; longer intervals are clamped
const MAX_INTERVAL_SECS: u64 = 365 * 24 * 3600;

/// Tracks when the next periodic status line is due
pub struct Heartbeat {
    interval: Duration,
    last_beat: DateTime<Utc>,
    clock: Arc<dyn Clock>,
}

impl Heartbeat {
    /// Create a new heartbeat with the given interval in seconds
    pub fn new(interval_secs: u64, clock: Arc<dyn Clock>) -> Self {
        let interval = Duration::seconds(interval_secs.min(MAX_INTERVAL_SECS) as i64);
        Self {
            interval,
            last_beat: clock.now(),
            clock,
        }
    }

    /// Check if enough time has passed since the last beat
    pub fn should_beat(&self) -> bool {
        self.clock.now().signed_duration_since(self.last_beat) >= self.interval
    }

    /// Record a heartbeat at the current time
    pub fn beat(&mut self) {
        self.last_beat = self.clock.now();
    }

    /// Beat if due; returns whether a status line should be written
    pub fn tick(&mut self) -> bool {
        if self.should_beat() {
            self.beat();
            true
        } else {
            false
        }
    }
}
