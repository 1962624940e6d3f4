//! Verification state machine
//!
//! Each finished result is compared against the outstanding predictions. For
//! one record, the distance between the incoming game and the record's target
//! decides what happens:
//!
//! | offset            | outcome in first group | step              |
//! |-------------------|------------------------|-------------------|
//! | `< 0`             | -                      | skip              |
//! | `0..max`          | yes                    | correct @ offset  |
//! | `0..max`          | no                     | keep waiting      |
//! | `== max`          | yes / no               | correct / failed  |
//! | `> max`           | -                      | failed            |
//!
//! With an open-ended window a record waits until its suit shows up.

use crate::domain::Resolution;

/// Range of offsets at which a prediction may still succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationWindow {
    max_offset: Option<u32>,
}

impl VerificationWindow {
    pub fn bounded(max_offset: u32) -> Self {
        Self {
            max_offset: Some(max_offset),
        }
    }

    pub fn open_ended() -> Self {
        Self { max_offset: None }
    }

    pub fn max_offset(&self) -> Option<u32> {
        self.max_offset
    }
}

impl From<Option<u32>> for VerificationWindow {
    fn from(max_offset: Option<u32>) -> Self {
        Self { max_offset }
    }
}

/// What one message does to one pending record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Message is about an earlier game; look at the next record
    Skip,
    /// Still inside the window without a match
    Wait,
    Resolve(Resolution),
}

impl VerificationWindow {
    /// Transition for a record at `offset`; `outcome_present` is only
    /// evaluated while the offset is inside the window
    pub fn step<F>(&self, offset: i128, outcome_present: F) -> Step
    where
        F: FnOnce() -> bool,
    {
        // Game ids are u64, so every non-negative offset fits
        let Ok(offset) = u64::try_from(offset) else {
            return Step::Skip;
        };

        match self.max_offset.map(u64::from) {
            Some(max) if offset > max => Step::Resolve(Resolution::Failed { offset }),
            max => {
                if outcome_present() {
                    Step::Resolve(Resolution::Correct { offset })
                } else if max.is_some_and(|max| offset >= max) {
                    Step::Resolve(Resolution::Failed { offset })
                } else {
                    Step::Wait
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_offset_skips() {
        let window = VerificationWindow::bounded(1);
        assert_eq!(window.step(-1, || true), Step::Skip);
    }

    #[test]
    fn test_hit_inside_window() {
        let window = VerificationWindow::bounded(3);
        assert_eq!(
            window.step(0, || true),
            Step::Resolve(Resolution::Correct { offset: 0 })
        );
        assert_eq!(
            window.step(3, || true),
            Step::Resolve(Resolution::Correct { offset: 3 })
        );
    }

    #[test]
    fn test_miss_waits_until_last_offset() {
        let window = VerificationWindow::bounded(3);
        assert_eq!(window.step(0, || false), Step::Wait);
        assert_eq!(window.step(2, || false), Step::Wait);
        assert_eq!(
            window.step(3, || false),
            Step::Resolve(Resolution::Failed { offset: 3 })
        );
    }

    #[test]
    fn test_beyond_window_fails_without_looking() {
        let window = VerificationWindow::bounded(1);
        let mut looked = false;
        let step = window.step(2, || {
            looked = true;
            true
        });
        assert_eq!(step, Step::Resolve(Resolution::Failed { offset: 2 }));
        assert!(!looked);
    }

    #[test]
    fn test_zero_width_window() {
        let window = VerificationWindow::bounded(0);
        assert_eq!(
            window.step(0, || false),
            Step::Resolve(Resolution::Failed { offset: 0 })
        );
    }

    #[test]
    fn test_far_offsets_keep_their_value() {
        let far = i128::from(u64::MAX);
        assert_eq!(
            VerificationWindow::open_ended().step(far, || true),
            Step::Resolve(Resolution::Correct { offset: u64::MAX })
        );
        assert_eq!(
            VerificationWindow::bounded(1).step(i128::from(u32::MAX) + 1, || true),
            Step::Resolve(Resolution::Failed { offset: u64::from(u32::MAX) + 1 })
        );
    }

    #[test]
    fn test_open_ended_window_never_fails() {
        let window = VerificationWindow::open_ended();
        assert_eq!(window.step(500, || false), Step::Wait);
        assert_eq!(
            window.step(500, || true),
            Step::Resolve(Resolution::Correct { offset: 500 })
        );
    }
}
