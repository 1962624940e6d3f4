//! Card suits and glyph normalization
//!
//! The feed writes suits as emoji glyphs, sometimes with and sometimes
//! without the emoji variation selector, and hearts show up both as `♥️`
//! and `❤️`. Everything is folded to one canonical spelling before any
//! comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// U+FE0F, requests emoji presentation of the preceding symbol
pub const VARIATION_SELECTOR: char = '\u{FE0F}';

/// One of the four card suits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    /// Map a single base symbol to its suit
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '♠' => Some(Suit::Spades),
            '♥' | '❤' => Some(Suit::Hearts),
            '♦' => Some(Suit::Diamonds),
            '♣' => Some(Suit::Clubs),
            _ => None,
        }
    }

    /// Canonical glyph used for matching inside normalized text
    pub fn glyph(self) -> &'static str {
        match self {
            Suit::Spades => "♠️",
            Suit::Hearts => "♥️",
            Suit::Diamonds => "♦️",
            Suit::Clubs => "♣️",
        }
    }

    /// Glyph printed in outbound prediction messages.
    ///
    /// Hearts are announced as `❤️`, which is what the channel has always shown.
    pub fn display_glyph(self) -> &'static str {
        match self {
            Suit::Hearts => "❤️",
            other => other.glyph(),
        }
    }

    /// Suit predicted by the mirror rule
    pub fn mirror(self) -> Suit {
        match self {
            Suit::Spades => Suit::Diamonds,
            Suit::Diamonds => Suit::Spades,
            Suit::Hearts => Suit::Clubs,
            Suit::Clubs => Suit::Hearts,
        }
    }

    /// Parse a token made of exactly one suit glyph (any accepted variant)
    pub fn parse(token: &str) -> Option<Self> {
        let mut symbols = token
            .trim()
            .chars()
            .filter(|c| *c != VARIATION_SELECTOR);
        let suit = symbols.next().and_then(Suit::from_symbol)?;
        match symbols.next() {
            None => Some(suit),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_glyph())
    }
}

/// Rewrite every suit glyph in `text` to its canonical form.
///
/// Bare symbols gain the variation selector, `❤️` becomes `♥️`, and all other
/// characters pass through untouched.
pub fn normalize_suits(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match Suit::from_symbol(c) {
            Some(suit) => {
                out.push_str(suit.glyph());
                if chars.peek() == Some(&VARIATION_SELECTOR) {
                    chars.next();
                }
            }
            None => out.push(c),
        }
    }

    out
}
