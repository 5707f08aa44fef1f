//! # vetter-core
//!
//! Deterministic core of the hybrid profile-legitimacy engine.
//!
//! This crate owns everything that must be reproducible and auditable:
//! - The rule engine: heuristic category checks over subject attributes
//! - The combination math: weighted score, confidence adjustment, decision
//! - The data model and the immutable scoring configuration
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same input always produces the same output
//! 2. **No I/O**: no network, no clock dependence beyond timestamps
//! 3. **Infallible scoring**: malformed input degrades to neutral, never errors
//! 4. **Explainable**: every penalty leaves a flag with a code and detail
//!
//! The asynchronous sources (external verification, LLM-backed semantic
//! assessment) and the orchestration live in `vetter-runtime`; they feed
//! [`PartialResult`]s into [`ScoreCombiner::combine`].

pub mod checks;
pub mod combine;
pub mod config;
pub mod rules;
pub mod types;

pub use combine::{Combined, ScoreCombiner};
pub use config::{ConfidenceTuning, ConfigError, ScoringConfig, Thresholds, Weights};
pub use rules::RuleEngine;
pub use types::{
    ContactChannels, Decision, DecisionRecord, Flag, FlagSeverity, PartialResult,
    ProcessingMetrics, RawScores, ScoreBreakdown, SourceKind, Subject, SubjectStatus,
    WeightedScores,
};
