//! Core data model for the scoring pipeline.
//!
//! Everything here is a closed, tagged structure. Loosely-typed payloads from
//! upstream providers are normalized into [`PartialResult`] at each adapter
//! boundary, never inside the combination logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Weights;

/// A profile under evaluation. Owned by an upstream collaborator;
/// read-only to this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Stable identifier assigned upstream.
    pub id: String,

    /// Declared personal name.
    #[serde(default)]
    pub full_name: String,

    /// Declared organization name.
    #[serde(default)]
    pub company_name: String,

    /// Contact channels (email/phone).
    #[serde(default)]
    pub contact: ContactChannels,

    /// Declared role, if any.
    #[serde(default)]
    pub role: Option<String>,

    /// Declared industry, if any.
    #[serde(default)]
    pub industry: Option<String>,

    /// Declared website, if any.
    #[serde(default)]
    pub website: Option<String>,
}

/// Contact channels declared on a subject.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactChannels {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,
}

impl Subject {
    /// Structural precondition for scoring: the subject must be addressable
    /// (non-blank id) and carry at least one identity attribute.
    ///
    /// Scoring degradation never comes through here — a subject with a weird
    /// name still scores; a subject with *no* identity at all cannot.
    pub fn is_structurally_valid(&self) -> bool {
        !self.id.trim().is_empty()
            && (!self.full_name.trim().is_empty() || !self.company_name.trim().is_empty())
    }
}

/// Which signal source produced a [`PartialResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    RuleBased,
    External,
    Semantic,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::RuleBased => "rule_based",
            SourceKind::External => "external",
            SourceKind::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tier of a triggered rule flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSeverity {
    High,
    Medium,
    Low,
}

/// A triggered heuristic, with a stable code and a human-readable detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    pub code: String,
    pub severity: FlagSeverity,
    pub detail: String,
}

impl Flag {
    pub fn new(code: impl Into<String>, severity: FlagSeverity, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            detail: detail.into(),
        }
    }
}

/// One source's contribution to a scoring run.
///
/// Produced once per source per run and immutable after creation. A degraded
/// source still produces a `PartialResult` — with a neutral/fallback score
/// and the cause recorded in `error` — so the combination never has to deal
/// with a missing leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialResult {
    pub source: SourceKind,

    /// Score in [0, 100].
    pub score: f64,

    /// Confidence in [0, 100], if the source reports one.
    pub confidence: Option<f64>,

    #[serde(default)]
    pub flags: Vec<Flag>,

    #[serde(default)]
    pub details: Vec<String>,

    /// Cause of degradation, if this result is a fallback.
    #[serde(default)]
    pub error: Option<String>,

    pub latency_ms: u64,
}

impl PartialResult {
    pub fn new(source: SourceKind, score: f64) -> Self {
        Self {
            source,
            score: score.clamp(0.0, 100.0),
            confidence: None,
            flags: Vec::new(),
            details: Vec::new(),
            error: None,
            latency_ms: 0,
        }
    }

    /// A fallback result carrying the degradation cause.
    pub fn degraded(
        source: SourceKind,
        score: f64,
        confidence: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            source,
            score: score.clamp(0.0, 100.0),
            confidence: Some(confidence.clamp(0.0, 100.0)),
            flags: Vec::new(),
            details: Vec::new(),
            error: Some(error.into()),
            latency_ms: 0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 100.0));
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }

    pub fn count_by_severity(&self, severity: FlagSeverity) -> usize {
        self.flags.iter().filter(|f| f.severity == severity).count()
    }
}

/// Final decision for a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Flag,
    PendingReview,
}

impl Decision {
    /// Subject status written back by the persistence layer.
    pub fn subject_status(&self) -> SubjectStatus {
        match self {
            Decision::Approve => SubjectStatus::Approved,
            Decision::Flag => SubjectStatus::Flagged,
            Decision::PendingReview => SubjectStatus::Pending,
        }
    }
}

/// Persisted subject status, mapped 1:1 from [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectStatus {
    Approved,
    Flagged,
    Pending,
}

impl SubjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectStatus::Approved => "approved",
            SubjectStatus::Flagged => "flagged",
            SubjectStatus::Pending => "pending",
        }
    }
}

/// Raw scores per source, before weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawScores {
    pub rule_based: f64,
    pub external: f64,
    pub semantic: f64,
}

/// Weighted contributions per source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightedScores {
    pub rule_based: f64,
    pub external: f64,
    pub semantic: f64,
}

/// How the final score was assembled: raw scores, the weights applied,
/// and the resulting per-source contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub raw: RawScores,
    pub weighted: WeightedScores,
    pub weights: Weights,
}

/// Per-run observability: stage latencies, provider call volume, and the
/// union of degraded-source errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingMetrics {
    pub rule_latency_ms: u64,
    pub external_latency_ms: u64,
    pub semantic_latency_ms: u64,
    pub total_latency_ms: u64,

    /// Verification/provider calls issued for this run.
    pub api_calls_count: u32,

    /// Accumulated per-source degradation causes.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// The full, immutable outcome of one `decide` invocation.
///
/// A subject may be re-scored any number of times; each run produces a new,
/// independent record. Nothing in this crate mutates a past record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub subject_id: String,

    /// Weighted final score in [0, 100].
    pub final_score: f64,

    pub decision: Decision,

    /// Combined confidence in [0, 100].
    pub confidence: f64,

    pub breakdown: ScoreBreakdown,

    pub partial_results: Vec<PartialResult>,

    pub metrics: ProcessingMetrics,

    pub evaluated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_result_clamps_score() {
        let r = PartialResult::new(SourceKind::RuleBased, 140.0);
        assert_eq!(r.score, 100.0);

        let r = PartialResult::new(SourceKind::External, -5.0);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn test_degraded_carries_error() {
        let r = PartialResult::degraded(SourceKind::Semantic, 50.0, 0.0, "timeout");
        assert_eq!(r.score, 50.0);
        assert_eq!(r.confidence, Some(0.0));
        assert_eq!(r.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_decision_status_mapping() {
        assert_eq!(Decision::Approve.subject_status().as_str(), "approved");
        assert_eq!(Decision::Flag.subject_status().as_str(), "flagged");
        assert_eq!(Decision::PendingReview.subject_status().as_str(), "pending");
    }

    #[test]
    fn test_structural_validity() {
        let mut subject = Subject {
            id: "s-1".to_string(),
            full_name: "Jane Doe".to_string(),
            company_name: String::new(),
            contact: ContactChannels::default(),
            role: None,
            industry: None,
            website: None,
        };
        assert!(subject.is_structurally_valid());

        subject.full_name = String::new();
        assert!(!subject.is_structurally_valid());

        subject.company_name = "Acme Corp".to_string();
        assert!(subject.is_structurally_valid());

        subject.id = "  ".to_string();
        assert!(!subject.is_structurally_valid());
    }

    #[test]
    fn test_severity_counts() {
        let mut r = PartialResult::new(SourceKind::RuleBased, 60.0);
        r.flags.push(Flag::new("a", FlagSeverity::High, "x"));
        r.flags.push(Flag::new("b", FlagSeverity::Low, "y"));
        r.flags.push(Flag::new("c", FlagSeverity::Low, "z"));

        assert_eq!(r.flag_count(), 3);
        assert_eq!(r.count_by_severity(FlagSeverity::High), 1);
        assert_eq!(r.count_by_severity(FlagSeverity::Medium), 0);
        assert_eq!(r.count_by_severity(FlagSeverity::Low), 2);
    }
}
