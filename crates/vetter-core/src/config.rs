//! Scoring configuration: source weights, decision thresholds, and
//! confidence-tuning constants.
//!
//! Configuration is loaded once at startup into an immutable value that is
//! passed into the engine at construction. There is no mutable singleton;
//! the only load-time concern is the weight-sum invariant, which is a
//! non-fatal warning.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Tolerance for the weight-sum invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Errors loading configuration. Invariant violations are *not* errors —
/// they log a warning and the configuration is used as-is.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Fractional importance of each source in the final weighted score.
///
/// Invariant: the three weights sum to 1.0 within ±0.01. A violation is a
/// configuration warning, logged once at load; the combination still runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weights {
    pub rule_based: f64,
    pub semantic: f64,
    pub external: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            rule_based: 0.30,
            semantic: 0.40,
            external: 0.30,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.rule_based + self.semantic + self.external
    }

    /// Whether the sum invariant holds.
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

/// Decision thresholds applied to the combined score and confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum final score for approval.
    pub approve_score: f64,

    /// Final scores below this are flag candidates.
    pub flag_score: f64,

    /// Minimum confidence required to approve.
    pub approve_confidence_min: f64,

    /// Minimum confidence required to flag.
    pub flag_confidence_min: f64,

    /// Confidence below this forces pending review, at any score.
    pub low_confidence_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            approve_score: 70.0,
            flag_score: 40.0,
            approve_confidence_min: 70.0,
            flag_confidence_min: 60.0,
            low_confidence_min: 50.0,
        }
    }
}

/// Constants for the confidence adjustment in the combination step.
///
/// Divergence is the population standard deviation of the three raw scores.
/// The larger applicable penalty is applied, never both. The agreement bonus
/// applies when all three raw scores sit on the same side of the band
/// boundaries (all at/above `high_band`, or all below `low_band`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceTuning {
    pub medium_divergence: f64,
    pub high_divergence: f64,
    pub medium_penalty: f64,
    pub high_penalty: f64,
    pub agreement_bonus: f64,
    pub high_band: f64,
    pub low_band: f64,
}

impl Default for ConfidenceTuning {
    fn default() -> Self {
        Self {
            medium_divergence: 15.0,
            high_divergence: 25.0,
            medium_penalty: 10.0,
            high_penalty: 20.0,
            agreement_bonus: 10.0,
            high_band: 70.0,
            low_band: 40.0,
        }
    }
}

/// The immutable scoring configuration: weights, thresholds, and tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: Weights,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub tuning: ConfidenceTuning,
}

impl ScoringConfig {
    /// Parse configuration from YAML and run the load-time invariant check.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check_invariants();
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Log the weight-sum warning if the invariant is violated. Non-fatal.
    pub fn check_invariants(&self) {
        if !self.weights.is_normalized() {
            tracing::warn!(
                sum = self.weights.sum(),
                tolerance = WEIGHT_SUM_TOLERANCE,
                "source weights do not sum to 1.0; scores will be skewed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_normalized() {
        assert!(Weights::default().is_normalized());
    }

    #[test]
    fn test_weight_tolerance() {
        let w = Weights {
            rule_based: 0.30,
            semantic: 0.40,
            external: 0.305,
        };
        assert!(w.is_normalized());

        let w = Weights {
            rule_based: 0.5,
            semantic: 0.5,
            external: 0.5,
        };
        assert!(!w.is_normalized());
    }

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.approve_score, 70.0);
        assert_eq!(t.flag_score, 40.0);
        assert_eq!(t.approve_confidence_min, 70.0);
        assert_eq!(t.flag_confidence_min, 60.0);
        assert_eq!(t.low_confidence_min, 50.0);
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
weights:
  rule_based: 0.25
  semantic: 0.5
  external: 0.25
thresholds:
  approve_score: 75
  flag_score: 35
  approve_confidence_min: 70
  flag_confidence_min: 60
  low_confidence_min: 50
"#;
        let config = ScoringConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.weights.semantic, 0.5);
        assert_eq!(config.thresholds.approve_score, 75.0);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.tuning.agreement_bonus, 10.0);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ScoringConfig::from_yaml("{}").unwrap();
        assert!(config.weights.is_normalized());
    }

    #[test]
    fn test_unnormalized_weights_still_load() {
        let yaml = r#"
weights:
  rule_based: 0.9
  semantic: 0.9
  external: 0.9
"#;
        // Logs a warning; never fails.
        let config = ScoringConfig::from_yaml(yaml).unwrap();
        assert!(!config.weights.is_normalized());
    }
}
