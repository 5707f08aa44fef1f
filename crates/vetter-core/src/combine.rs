//! Deterministic fan-in: weighted score, confidence adjustment, decision.
//!
//! Everything here is pure arithmetic over three [`PartialResult`]s and the
//! immutable [`ScoringConfig`]. Upstream sources may be non-deterministic;
//! given identical partials this combination always produces the identical
//! outcome.

use crate::config::ScoringConfig;
use crate::types::{
    Decision, PartialResult, RawScores, ScoreBreakdown, WeightedScores,
};

/// Outcome of combining the three source partials.
#[derive(Debug, Clone)]
pub struct Combined {
    pub final_score: f64,
    pub confidence: f64,
    pub decision: Decision,
    pub breakdown: ScoreBreakdown,
}

/// Merges the three source signals under the configured weights and
/// thresholds.
pub struct ScoreCombiner {
    config: ScoringConfig,
}

impl ScoreCombiner {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Combine the three partials into a final score, confidence, and
    /// decision.
    pub fn combine(
        &self,
        rule: &PartialResult,
        external: &PartialResult,
        semantic: &PartialResult,
    ) -> Combined {
        let weights = self.config.weights;

        let raw = RawScores {
            rule_based: rule.score,
            external: external.score,
            semantic: semantic.score,
        };

        let weighted = WeightedScores {
            rule_based: raw.rule_based * weights.rule_based,
            external: raw.external * weights.external,
            semantic: raw.semantic * weights.semantic,
        };

        let final_score =
            (weighted.rule_based + weighted.external + weighted.semantic).clamp(0.0, 100.0);

        let confidence = self.confidence(&raw, semantic.confidence.unwrap_or(0.0));
        let decision = self.decide(final_score, confidence);

        Combined {
            final_score,
            confidence,
            decision,
            breakdown: ScoreBreakdown {
                raw,
                weighted,
                weights,
            },
        }
    }

    /// Confidence starts from the semantic source's own confidence, is
    /// penalized when the raw scores diverge, and earns a bonus when all
    /// three agree directionally.
    fn confidence(&self, raw: &RawScores, semantic_confidence: f64) -> f64 {
        let tuning = self.config.tuning;
        let scores = [raw.rule_based, raw.external, raw.semantic];

        let mut confidence = semantic_confidence;

        let divergence = std_dev(&scores);
        if divergence > tuning.high_divergence {
            confidence -= tuning.high_penalty;
        } else if divergence > tuning.medium_divergence {
            confidence -= tuning.medium_penalty;
        }

        let all_high = scores.iter().all(|s| *s >= tuning.high_band);
        let all_low = scores.iter().all(|s| *s < tuning.low_band);
        if all_high || all_low {
            confidence += tuning.agreement_bonus;
        }

        confidence.clamp(0.0, 100.0)
    }

    /// The decision table. Low confidence forces review regardless of score;
    /// the approve/flag bands additionally require their own confidence
    /// minimums.
    fn decide(&self, final_score: f64, confidence: f64) -> Decision {
        let t = self.config.thresholds;

        if confidence < t.low_confidence_min {
            return Decision::PendingReview;
        }
        if final_score >= t.approve_score && confidence >= t.approve_confidence_min {
            return Decision::Approve;
        }
        if final_score < t.flag_score && confidence >= t.flag_confidence_min {
            return Decision::Flag;
        }
        Decision::PendingReview
    }
}

/// Population standard deviation.
fn std_dev(scores: &[f64]) -> f64 {
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
