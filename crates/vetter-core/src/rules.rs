//! The deterministic rule engine.
//!
//! Fans out over the six category checks, combines their scores with fixed
//! category weights, then applies a flat penalty per flag tier. Pure: no I/O,
//! no failure path. Malformed input degrades to neutral category scores,
//! never to an error.

use std::time::Instant;

use crate::checks::{
    CategoryCheck, CompanyCheck, EmailCheck, IndustryCheck, NameCheck, PhoneCheck, WebsiteCheck,
};
use crate::types::{FlagSeverity, PartialResult, SourceKind, Subject};

/// Flat deduction per high-severity flag.
const HIGH_FLAG_PENALTY: f64 = 8.0;
/// Flat deduction per medium-severity flag.
const MEDIUM_FLAG_PENALTY: f64 = 4.0;
/// Flat deduction per low-severity flag.
const LOW_FLAG_PENALTY: f64 = 1.0;

/// Confidence reported by the rule engine. Fixed and high: the signal is
/// deterministic, discounted only because category heuristics are coarse.
const RULE_CONFIDENCE: f64 = 90.0;

/// Deterministic heuristic scorer over subject attributes.
pub struct RuleEngine {
    checks: Vec<Box<dyn CategoryCheck>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(NameCheck),
                Box::new(CompanyCheck),
                Box::new(EmailCheck),
                Box::new(PhoneCheck),
                Box::new(WebsiteCheck),
                Box::new(IndustryCheck),
            ],
        }
    }

    /// Score a subject. Same input always produces the same result.
    pub fn evaluate(&self, subject: &Subject) -> PartialResult {
        let started = Instant::now();

        let mut weighted_sum = 0.0;
        let mut result = PartialResult::new(SourceKind::RuleBased, 0.0);

        for check in &self.checks {
            let finding = check.evaluate(subject);
            weighted_sum += finding.score * finding.category.weight();
            result.details.extend(finding.details);
            result.flags.extend(finding.flags);
        }

        let flag_penalty = result.count_by_severity(FlagSeverity::High) as f64 * HIGH_FLAG_PENALTY
            + result.count_by_severity(FlagSeverity::Medium) as f64 * MEDIUM_FLAG_PENALTY
            + result.count_by_severity(FlagSeverity::Low) as f64 * LOW_FLAG_PENALTY;

        result.score = (weighted_sum - flag_penalty).clamp(0.0, 100.0);
        result.confidence = Some(RULE_CONFIDENCE);
        result.latency_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            subject_id = %subject.id,
            score = result.score,
            flags = result.flag_count(),
            "rule evaluation complete"
        );

        result
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContactChannels;

    fn clean_subject() -> Subject {
        Subject {
            id: "s-1".to_string(),
            full_name: "Jane Doe".to_string(),
            company_name: "Acme Manufacturing".to_string(),
            contact: ContactChannels {
                email: Some("jane.doe@acme.com".to_string()),
                phone: Some("+1 415 555 0132".to_string()),
            },
            role: Some("Operations Manager".to_string()),
            industry: Some("Manufacturing".to_string()),
            website: Some("https://acme.com".to_string()),
        }
    }

    #[test]
    fn test_clean_subject_scores_high() {
        let result = RuleEngine::new().evaluate(&clean_subject());
        assert_eq!(result.score, 100.0);
        assert_eq!(result.confidence, Some(RULE_CONFIDENCE));
        assert!(result.flags.is_empty());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_empty_subject_is_all_neutral() {
        let subject = Subject {
            id: "s-2".to_string(),
            full_name: String::new(),
            company_name: String::new(),
            contact: ContactChannels::default(),
            role: None,
            industry: None,
            website: None,
        };
        let result = RuleEngine::new().evaluate(&subject);
        // Every category neutral (50), no flags, so no flat penalty.
        assert_eq!(result.score, 50.0);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_fraudulent_subject_scores_low() {
        let subject = Subject {
            id: "s-3".to_string(),
            full_name: "test1111".to_string(),
            company_name: "Quick Cash Guaranteed".to_string(),
            contact: ContactChannels {
                email: Some("x@mailinator.com".to_string()),
                phone: Some("1234567890".to_string()),
            },
            role: None,
            industry: Some("crypto".to_string()),
            website: Some("https://free-money.tk".to_string()),
        };
        let result = RuleEngine::new().evaluate(&subject);
        assert!(result.score < 40.0, "got {}", result.score);
        assert!(result.count_by_severity(FlagSeverity::High) >= 3);
    }

    #[test]
    fn test_determinism() {
        let engine = RuleEngine::new();
        let subject = clean_subject();
        let a = engine.evaluate(&subject);
        let b = engine.evaluate(&subject);
        assert_eq!(a.score, b.score);
        assert_eq!(a.flag_count(), b.flag_count());
    }

    #[test]
    fn test_flag_penalty_applies_on_top_of_weights() {
        let mut subject = clean_subject();
        subject.contact.email = Some("x@mailinator.com".to_string());
        let result = RuleEngine::new().evaluate(&subject);
        // Email category drops to 65 (weight .20 => -7), plus one high flag (-8).
        assert_eq!(result.score, 85.0);
    }
}
