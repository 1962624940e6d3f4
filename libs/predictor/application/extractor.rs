//! Text extraction from raw feed messages
//!
//! A finished result looks like `#n812. 3(K♠️10♦️) - ✅7(8♣️9♥️) #T10`:
//! the game number follows `#` and a one-letter flag, and the first
//! parenthesized group holds the cards the rules look at.

use super::rules::{RuleTable, SignalToken};
use crate::domain::{normalize_suits, GameId, Suit};
use regex::Regex;
use std::sync::LazyLock;

static GAME_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Za-z](\d+)").expect("game id pattern is valid"));

static FIRST_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("group pattern is valid"));

/// Content of the first parenthesized group, as written
pub fn first_group(text: &str) -> Option<&str> {
    FIRST_GROUP_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Stateless extractor of game ids, signals and completion markers
#[derive(Debug, Clone)]
pub struct TextExtractor {
    completion_markers: Vec<String>,
}

impl TextExtractor {
    pub fn new(completion_markers: Vec<String>) -> Self {
        Self { completion_markers }
    }

    /// First `#<letter><digits>` in the text
    pub fn extract_game_id(&self, text: &str) -> Option<GameId> {
        GAME_ID_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(GameId)
    }

    /// First rule key found in the first parenthesized group.
    ///
    /// Keys are tried in rule-table order, not in the order they appear in
    /// the text: when several keys match, the one listed first wins.
    pub fn extract_signal(&self, text: &str, rules: &RuleTable) -> Option<SignalToken> {
        let normalized = normalize_suits(text);
        let group = first_group(&normalized)?;

        rules
            .keys()
            .find(|key| group.contains(key.as_str()))
            .cloned()
    }

    /// Whether the message is a finished result
    pub fn has_completion_marker(&self, text: &str) -> bool {
        self.completion_markers
            .iter()
            .any(|marker| text.contains(marker.as_str()))
    }

    /// Whether `suit` shows up in the first parenthesized group
    pub fn contains_outcome(&self, text: &str, suit: Suit) -> bool {
        let normalized = normalize_suits(text);
        first_group(&normalized)
            .map(|group| group.contains(suit.glyph()))
            .unwrap_or(false)
    }

    /// Count of each suit in the first parenthesized group
    pub fn suit_counts(&self, text: &str) -> [(Suit, usize); 4] {
        let normalized = normalize_suits(text);
        let group = first_group(&normalized).unwrap_or("");
        Suit::ALL.map(|suit| (suit, group.matches(suit.glyph()).count()))
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(vec!["✅".to_string(), "🔰".to_string()])
    }
}
