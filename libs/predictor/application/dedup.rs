//! Bounded memory of already-accepted message texts

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Stable hash of a raw message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Fingerprint(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..6]))
    }
}

/// Set of fingerprints bounded by count and by age.
///
/// Duplicate deliveries arrive close together, so forgetting old entries
/// does not weaken deduplication in practice.
#[derive(Debug)]
pub struct SeenMessageSet {
    seen: HashMap<Fingerprint, DateTime<Utc>>,
    /// Insertion order; may hold stale entries for re-inserted fingerprints
    order: VecDeque<(Fingerprint, DateTime<Utc>)>,
    capacity: usize,
    retention: Duration,
}

impl SeenMessageSet {
    pub fn new(capacity: usize, retention: Duration) -> Self {
        Self {
            seen: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            retention,
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> bool {
        self.seen
            .get(fingerprint)
            .map(|at| now.signed_duration_since(*at) < self.retention)
            .unwrap_or(false)
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, now: DateTime<Utc>) {
        self.evict_expired(now);

        while self.seen.len() >= self.capacity && !self.seen.contains_key(&fingerprint) {
            if !self.pop_oldest() {
                break;
            }
        }

        self.seen.insert(fingerprint, now);
        self.order.push_back((fingerprint, now));
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) {
        while let Some((_, at)) = self.order.front() {
            if now.signed_duration_since(*at) < self.retention {
                break;
            }
            self.pop_oldest();
        }
    }

    /// Drop the front of the queue; returns false when the queue is empty
    fn pop_oldest(&mut self) -> bool {
        match self.order.pop_front() {
            Some((fingerprint, at)) => {
                // Only remove if this queue entry is the live one
                if self.seen.get(&fingerprint) == Some(&at) {
                    self.seen.remove(&fingerprint);
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(Fingerprint::of("#n1 (A♠️) ✅"), Fingerprint::of("#n1 (A♠️) ✅"));
        assert_ne!(Fingerprint::of("#n1 (A♠️) ✅"), Fingerprint::of("#n2 (A♠️) ✅"));
        assert_eq!(Fingerprint::of("abc").to_string().len(), 12);
    }

    #[test]
    fn test_contains_after_insert() {
        let now = Utc::now();
        let mut set = SeenMessageSet::new(10, Duration::hours(1));
        let fp = Fingerprint::of("hello");

        assert!(!set.contains(&fp, now));
        set.insert(fp, now);
        assert!(set.contains(&fp, now + Duration::minutes(59)));
        assert!(!set.contains(&fp, now + Duration::hours(1)));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let now = Utc::now();
        let mut set = SeenMessageSet::new(2, Duration::hours(1));
        let (a, b, c) = (Fingerprint::of("a"), Fingerprint::of("b"), Fingerprint::of("c"));

        set.insert(a, now);
        set.insert(b, now);
        set.insert(c, now);

        assert_eq!(set.len(), 2);
        assert!(!set.contains(&a, now));
        assert!(set.contains(&b, now));
        assert!(set.contains(&c, now));
    }

    #[test]
    fn test_expired_entries_are_dropped_on_insert() {
        let now = Utc::now();
        let mut set = SeenMessageSet::new(10, Duration::minutes(5));

        set.insert(Fingerprint::of("old"), now);
        set.insert(Fingerprint::of("new"), now + Duration::minutes(10));

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_reinsert_refreshes_entry() {
        let now = Utc::now();
        let mut set = SeenMessageSet::new(2, Duration::minutes(5));
        let a = Fingerprint::of("a");

        set.insert(a, now);
        set.insert(a, now + Duration::minutes(4));
        set.insert(Fingerprint::of("b"), now + Duration::minutes(6));

        assert!(set.contains(&a, now + Duration::minutes(6)));
        assert_eq!(set.len(), 2);
    }
}
