//! Per-user message rate limiting for private chats

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Over the limit; `notify` is set only for the first refusal of a burst
    Limited { notify: bool },
}

#[derive(Debug, Default)]
struct UserWindow {
    hits: VecDeque<DateTime<Utc>>,
    notified: bool,
}

/// Rolling window limiter: at most `max_messages` per `window` per user
#[derive(Debug)]
pub struct RateLimiter {
    max_messages: usize,
    window: Duration,
    users: HashMap<i64, UserWindow>,
}

impl RateLimiter {
    pub fn new(max_messages: usize, window: Duration) -> Self {
        Self {
            max_messages,
            window,
            users: HashMap::new(),
        }
    }

    /// Count a message from `user_id` at `now`. Refused messages are not
    /// counted.
    pub fn check(&mut self, user_id: i64, now: DateTime<Utc>) -> RateDecision {
        let window = self.window;
        let entry = self.users.entry(user_id).or_default();

        while let Some(&oldest) = entry.hits.front() {
            if now.signed_duration_since(oldest) < window {
                break;
            }
            entry.hits.pop_front();
        }

        if entry.hits.len() >= self.max_messages {
            let notify = !entry.notified;
            entry.notified = true;
            return RateDecision::Limited { notify };
        }

        entry.notified = false;
        entry.hits.push_back(now);
        RateDecision::Allowed
    }

    /// Drop users with no message inside the window
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let window = self.window;
        self.users.retain(|_, user| {
            user.hits
                .back()
                .is_some_and(|last| now.signed_duration_since(*last) < window)
        });
    }

    pub fn tracked_users(&self) -> usize {
        self.users.len()
    }
}
