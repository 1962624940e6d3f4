//! Engine configuration
//!
//! Everything that changed between rule generations of the feed (window size,
//! failure glyph, signal detection) is a setting here rather than a constant.

use super::{ConfigError, Result};
use crate::domain::Suit;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Prediction engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Only messages from this channel feed the engine
    #[serde(default = "default_source_channel_id")]
    pub source_channel_id: i64,

    /// Where predictions go unless a redirect says otherwise
    #[serde(default = "default_prediction_channel_id")]
    pub prediction_channel_id: i64,

    /// Predictions target `source game + target_offset`
    #[serde(default = "default_target_offset")]
    pub target_offset: u64,

    /// Last offset (inclusive) at which a prediction may still succeed;
    /// `null` keeps predictions open until they succeed
    #[serde(default = "default_max_offset")]
    pub max_offset: Option<u32>,

    /// Status glyph of a failed prediction (`❌` or `⭕`)
    #[serde(default = "default_failure_glyph")]
    pub failure_glyph: String,

    /// Glyph framing the target game number in prediction messages
    #[serde(default = "default_prediction_marker")]
    pub prediction_marker: String,

    /// A message is a finished result if it carries any of these
    #[serde(default = "default_completion_markers")]
    pub completion_markers: Vec<String>,

    /// How a message's signal is detected
    #[serde(default)]
    pub signal_rule: SignalRuleConfig,

    /// Minimum seconds between two accepted predictions
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Lowest cooldown an operator may set
    #[serde(default)]
    pub cooldown_min_secs: u64,

    /// Highest cooldown an operator may set
    #[serde(default = "default_cooldown_max_secs")]
    pub cooldown_max_secs: u64,

    /// File holding the last prediction time across restarts
    #[serde(default = "default_timestamp_file")]
    pub timestamp_file: String,

    /// Maximum number of remembered message fingerprints
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    /// Fingerprints older than this are forgotten
    #[serde(default = "default_dedup_retention_secs")]
    pub dedup_retention_secs: u64,

    /// Ignore new (non-edited) messages when looking for signals
    #[serde(default)]
    pub predict_from_edits_only: bool,
}

/// Signal detection strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalRuleConfig {
    /// Fixed card → suit table, matched in the listed order
    Fixed {
        #[serde(default = "default_rules")]
        rules: Vec<RuleEntry>,
    },
    /// Predict the mirror suit of any suit seen `threshold` times or more
    Mirror {
        #[serde(default = "default_mirror_threshold")]
        threshold: usize,
    },
}

impl Default for SignalRuleConfig {
    fn default() -> Self {
        SignalRuleConfig::Fixed {
            rules: default_rules(),
        }
    }
}

/// One row of the fixed rule table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleEntry {
    pub signal: String,
    pub outcome: String,
}

impl RuleEntry {
    pub fn new(signal: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            outcome: outcome.into(),
        }
    }
}

fn default_source_channel_id() -> i64 {
    -1002682552255
}

fn default_prediction_channel_id() -> i64 {
    -1002875505624
}

fn default_target_offset() -> u64 {
    2
}

fn default_max_offset() -> Option<u32> {
    Some(1)
}

fn default_failure_glyph() -> String {
    "❌".to_string()
}

fn default_prediction_marker() -> String {
    "🔵".to_string()
}

fn default_completion_markers() -> Vec<String> {
    vec!["✅".to_string(), "🔰".to_string()]
}

fn default_cooldown_secs() -> u64 {
    300 // 5 minutes
}

fn default_cooldown_max_secs() -> u64 {
    3600
}

fn default_timestamp_file() -> String {
    ".last_prediction_time".to_string()
}

fn default_dedup_capacity() -> usize {
    4096
}

fn default_dedup_retention_secs() -> u64 {
    3600
}

fn default_mirror_threshold() -> usize {
    3
}

/// Stock rule table of the feed
pub fn default_rules() -> Vec<RuleEntry> {
    [
        ("10♦️", "♠️"),
        ("10♠️", "❤️"),
        ("9♣️", "❤️"),
        ("9♦️", "♠️"),
        ("8♣️", "♠️"),
        ("8♠️", "♣️"),
        ("7♠️", "♠️"),
        ("7♣️", "♣️"),
        ("6♦️", "♣️"),
        ("6♣️", "♦️"),
    ]
    .into_iter()
    .map(|(signal, outcome)| RuleEntry::new(signal, outcome))
    .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_channel_id: default_source_channel_id(),
            prediction_channel_id: default_prediction_channel_id(),
            target_offset: default_target_offset(),
            max_offset: default_max_offset(),
            failure_glyph: default_failure_glyph(),
            prediction_marker: default_prediction_marker(),
            completion_markers: default_completion_markers(),
            signal_rule: SignalRuleConfig::default(),
            cooldown_secs: default_cooldown_secs(),
            cooldown_min_secs: 0,
            cooldown_max_secs: default_cooldown_max_secs(),
            timestamp_file: default_timestamp_file(),
            dedup_capacity: default_dedup_capacity(),
            dedup_retention_secs: default_dedup_retention_secs(),
            predict_from_edits_only: false,
        }
    }
}

impl EngineConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.target_offset == 0 {
            return Err(ConfigError::ValidationError(
                "target_offset must be greater than 0".to_string(),
            ));
        }

        if self.prediction_marker.is_empty() {
            return Err(ConfigError::ValidationError(
                "prediction_marker cannot be empty".to_string(),
            ));
        }

        if self.failure_glyph.is_empty() {
            return Err(ConfigError::ValidationError(
                "failure_glyph cannot be empty".to_string(),
            ));
        }

        if self.completion_markers.is_empty() || self.completion_markers.iter().any(|m| m.is_empty()) {
            return Err(ConfigError::ValidationError(
                "completion_markers must contain at least one non-empty marker".to_string(),
            ));
        }

        if self.cooldown_min_secs > self.cooldown_max_secs {
            return Err(ConfigError::ValidationError(format!(
                "cooldown_min_secs ({}) exceeds cooldown_max_secs ({})",
                self.cooldown_min_secs, self.cooldown_max_secs
            )));
        }

        if !self.cooldown_allowed(self.cooldown_secs) {
            return Err(ConfigError::ValidationError(format!(
                "cooldown_secs must be between {} and {}",
                self.cooldown_min_secs, self.cooldown_max_secs
            )));
        }

        if self.dedup_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "dedup_capacity must be greater than 0".to_string(),
            ));
        }

        match &self.signal_rule {
            SignalRuleConfig::Fixed { rules } => {
                if rules.is_empty() {
                    return Err(ConfigError::ValidationError(
                        "fixed signal rule needs at least one rule".to_string(),
                    ));
                }
                for rule in rules {
                    if rule.signal.trim().is_empty() {
                        return Err(ConfigError::ValidationError(
                            "rule signal cannot be empty".to_string(),
                        ));
                    }
                    if Suit::parse(&rule.outcome).is_none() {
                        return Err(ConfigError::ValidationError(format!(
                            "rule {} has unknown outcome suit '{}'",
                            rule.signal, rule.outcome
                        )));
                    }
                }
            }
            SignalRuleConfig::Mirror { threshold } => {
                if *threshold == 0 {
                    return Err(ConfigError::ValidationError(
                        "mirror threshold must be greater than 0".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Whether an operator may set this cooldown
    pub fn cooldown_allowed(&self, secs: u64) -> bool {
        (self.cooldown_min_secs..=self.cooldown_max_secs).contains(&secs)
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("  Source channel: {}", self.source_channel_id);
        info!("  Prediction channel: {}", self.prediction_channel_id);
        info!("  Target offset: +{}", self.target_offset);
        match self.max_offset {
            Some(max) => info!("  Verification window: +0..=+{}", max),
            None => info!("  Verification window: open-ended"),
        }
        info!("  Failure glyph: {}", self.failure_glyph);
        match &self.signal_rule {
            SignalRuleConfig::Fixed { rules } => info!("  Signal rule: fixed table ({} rules)", rules.len()),
            SignalRuleConfig::Mirror { threshold } => info!("  Signal rule: mirror (threshold {})", threshold),
        }
        info!(
            "  Cooldown: {}s (operator range {}..={}s)",
            self.cooldown_secs, self.cooldown_min_secs, self.cooldown_max_secs
        );
        info!("  Predict from edits only: {}", self.predict_from_edits_only);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.target_offset, 2);
        assert_eq!(config.max_offset, Some(1));
        assert_eq!(config.cooldown_secs, 300);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EngineConfig = serde_yaml::from_str("cooldown_secs: 60\n").unwrap();
        assert_eq!(config.cooldown_secs, 60);
        assert_eq!(config.completion_markers, vec!["✅", "🔰"]);
        assert_eq!(config.signal_rule, SignalRuleConfig::default());
    }

    #[test]
    fn test_null_window_is_open_ended() {
        let config: EngineConfig = serde_yaml::from_str("max_offset: null\n").unwrap();
        assert_eq!(config.max_offset, None);
    }

    #[test]
    fn test_mirror_rule_yaml() {
        let config: EngineConfig =
            serde_yaml::from_str("signal_rule:\n  kind: mirror\n  threshold: 4\n").unwrap();
        assert_eq!(config.signal_rule, SignalRuleConfig::Mirror { threshold: 4 });
    }

    #[test]
    fn test_rejects_unknown_outcome() {
        let config = EngineConfig {
            signal_rule: SignalRuleConfig::Fixed {
                rules: vec![RuleEntry::new("10♦️", "🃏")],
            },
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_cooldown_out_of_range() {
        let config = EngineConfig {
            cooldown_secs: 7200,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.cooldown_allowed(0));
        assert!(config.cooldown_allowed(3600));
        assert!(!config.cooldown_allowed(3601));
    }

    #[test]
    fn test_rejects_empty_markers() {
        let config = EngineConfig {
            completion_markers: vec![],
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
