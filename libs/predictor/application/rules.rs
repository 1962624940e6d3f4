//! Signal rules: which card combination predicts which suit

use super::extractor::TextExtractor;
use crate::domain::{normalize_suits, Suit};
use crate::infrastructure::config::{RuleEntry, SignalRuleConfig};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuleError {
    #[error("Rule table is empty")]
    Empty,

    #[error("Rule signal cannot be empty")]
    EmptySignal,

    #[error("Unknown outcome suit '{outcome}' for signal {signal}")]
    UnknownOutcome { signal: String, outcome: String },

    #[error("Signal {0} is listed twice")]
    DuplicateSignal(String),

    #[error("Mirror threshold must be greater than 0")]
    ZeroThreshold,
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// Normalized text fragment a rule keys on (`10♦️`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalToken(String);

impl SignalToken {
    pub fn new(raw: &str) -> Self {
        Self(normalize_suits(raw.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed signal → outcome table, immutable once built
#[derive(Debug, Clone)]
pub struct RuleTable {
    /// Rules in their configured order (drives signal tie-breaks)
    ordered: Vec<(SignalToken, Suit)>,
    index: HashMap<SignalToken, Suit>,
}

impl RuleTable {
    pub fn new<I>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (SignalToken, Suit)>,
    {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();

        for (signal, outcome) in rules {
            if signal.as_str().is_empty() {
                return Err(RuleError::EmptySignal);
            }
            if index.insert(signal.clone(), outcome).is_some() {
                return Err(RuleError::DuplicateSignal(signal.to_string()));
            }
            ordered.push((signal, outcome));
        }

        if ordered.is_empty() {
            return Err(RuleError::Empty);
        }

        Ok(Self { ordered, index })
    }

    /// Build from configured `signal`/`outcome` strings
    pub fn from_entries(entries: &[RuleEntry]) -> Result<Self> {
        let rules = entries
            .iter()
            .map(|entry| {
                let outcome = Suit::parse(&entry.outcome).ok_or_else(|| RuleError::UnknownOutcome {
                    signal: entry.signal.clone(),
                    outcome: entry.outcome.clone(),
                })?;
                Ok((SignalToken::new(&entry.signal), outcome))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(rules)
    }

    pub fn lookup(&self, signal: &SignalToken) -> Option<Suit> {
        self.index.get(signal).copied()
    }

    /// Keys in configured order
    pub fn keys(&self) -> impl Iterator<Item = &SignalToken> {
        self.ordered.iter().map(|(signal, _)| signal)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        let entries = crate::infrastructure::config::default_rules();
        Self::from_entries(&entries).expect("stock rule table is valid")
    }
}

/// A detected signal and the suit it predicts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub token: SignalToken,
    pub outcome: Suit,
}

/// How a finished result is turned into a prediction
#[derive(Debug, Clone)]
pub enum SignalRule {
    /// Fixed table lookup on the first group's cards
    Fixed(RuleTable),
    /// Any suit seen `threshold`+ times in the first group predicts its mirror
    Mirror { threshold: usize },
}

impl SignalRule {
    pub fn from_config(config: &SignalRuleConfig) -> Result<Self> {
        match config {
            SignalRuleConfig::Fixed { rules } => Ok(SignalRule::Fixed(RuleTable::from_entries(rules)?)),
            SignalRuleConfig::Mirror { threshold } => {
                if *threshold == 0 {
                    return Err(RuleError::ZeroThreshold);
                }
                Ok(SignalRule::Mirror {
                    threshold: *threshold,
                })
            }
        }
    }

    /// Signal carried by `text`, if any
    pub fn detect(&self, extractor: &TextExtractor, text: &str) -> Option<Signal> {
        match self {
            SignalRule::Fixed(table) => {
                let token = extractor.extract_signal(text, table)?;
                let outcome = table.lookup(&token)?;
                Some(Signal { token, outcome })
            }
            SignalRule::Mirror { threshold } => extractor
                .suit_counts(text)
                .into_iter()
                .find(|(_, count)| count >= threshold)
                .map(|(suit, count)| Signal {
                    token: SignalToken(format!("{}x{}", suit.glyph(), count)),
                    outcome: suit.mirror(),
                }),
        }
    }
}
