//! # vetter-runtime
//!
//! Async orchestration layer for vetter: external verification fan-out, the
//! LLM-backed semantic assessor, the decision engine, and batch scoring.
//!
//! The deterministic scoring math lives in `vetter-core`; this crate supplies
//! the non-deterministic legs and joins them. Design rules:
//!
//! - Every provider-backed sub-call runs under its own timeout via
//!   [`resilience::guard`]; failure degrades that leg to a fallback partial
//!   instead of failing the run.
//! - The engine holds no mutable state between invocations. Re-scoring a
//!   subject appends a new record; it never edits a past one.
//! - Vendor HTTP providers are feature-gated (`anthropic`); without them the
//!   offline heuristics stand in.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vetter_runtime::{AnthropicConfig, AnthropicProvider, DecisionEngine, MemoryStore};
//!
//! let provider = Arc::new(AnthropicProvider::from_env(AnthropicConfig::default())?);
//! let store = MemoryStore::new();
//! let engine = DecisionEngine::builder(provider)
//!     .subject_store(Arc::new(store.clone()))
//!     .decision_store(Arc::new(store.clone()))
//!     .build();
//!
//! let record = engine.decide("subject-42").await?;
//! println!("{:?} at {:.1}", record.decision, record.final_score);
//! ```

pub mod aggregator;
pub mod batch;
pub mod config;
pub mod engine;
pub mod providers;
pub mod resilience;
pub mod semantic;
pub mod store;
pub mod verification;

pub use aggregator::{ExternalAggregator, ExternalVerification};
pub use batch::{BatchItem, BatchOptions, BatchOutcome};
pub use config::RuntimeConfig;
pub use engine::{DecisionEngine, DecisionEngineBuilder, EngineError};
pub use providers::{
    ApiCredential, CredentialSource, ProviderError, Recommendation, SemanticPayload,
    SemanticProvider,
};
#[cfg(feature = "anthropic")]
pub use providers::{AnthropicConfig, AnthropicProvider};
pub use resilience::{guard, GuardedOutcome, Usage, UsageTracker};
pub use semantic::{SemanticAssessment, SemanticAssessor};
pub use store::{DecisionStore, MemoryStore, StoreError, SubjectStore};
pub use verification::{
    heuristic_outcome, Channel, HeuristicProvider, VerificationOutcome, VerificationProvider,
};
