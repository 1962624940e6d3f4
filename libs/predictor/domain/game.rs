//! Game and chat identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Telegram chat/channel id (negative for channels and supergroups)
pub type ChatId = i64;

/// Number of one round of the source feed (`#n1234` → `1234`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Game `n` rounds later, `None` on overflow
    pub fn forward(self, n: u64) -> Option<GameId> {
        self.0.checked_add(n).map(GameId)
    }

    /// Signed distance from `target` to this game (`self - target`)
    pub fn offset_from(self, target: GameId) -> i128 {
        i128::from(self.0) - i128::from(target.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GameId {
    fn from(value: u64) -> Self {
        GameId(value)
    }
}

/// Where an announced prediction lives, needed to edit it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub chat_id: ChatId,
    pub message_id: i64,
}

impl MessageHandle {
    pub fn new(chat_id: ChatId, message_id: i64) -> Self {
        Self { chat_id, message_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_signed() {
        let target = GameId(102);
        assert_eq!(GameId(102).offset_from(target), 0);
        assert_eq!(GameId(105).offset_from(target), 3);
        assert_eq!(GameId(100).offset_from(target), -2);
    }

    #[test]
    fn test_forward_overflow() {
        assert_eq!(GameId(100).forward(2), Some(GameId(102)));
        assert_eq!(GameId(u64::MAX).forward(1), None);
    }
}
