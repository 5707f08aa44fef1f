//! The decision engine: orchestrates one scoring run per subject.
//!
//! Concurrency shape: the rule engine runs first and its findings feed the
//! semantic prompt, so those two form one sequential leg; external
//! verification runs on its own leg. The two legs are joined, the three
//! partials are combined deterministically, and the outcome is persisted.
//!
//! Source degradation never escapes a run: a failed leg contributes its
//! fallback partial and the cause lands in the record's metrics. Only a
//! missing or structurally invalid subject, or a storage failure, aborts.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use vetter_core::{
    DecisionRecord, ProcessingMetrics, RuleEngine, ScoreCombiner, ScoringConfig, Subject,
};

use crate::aggregator::ExternalAggregator;
use crate::config::RuntimeConfig;
use crate::providers::SemanticProvider;
use crate::semantic::SemanticAssessor;
use crate::store::{DecisionStore, MemoryStore, StoreError, SubjectStore};
use crate::verification::{HeuristicProvider, VerificationProvider};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("subject '{0}' not found")]
    SubjectNotFound(String),

    #[error("subject '{0}' is structurally invalid: missing id or identity attributes")]
    InvalidSubject(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Orchestrates rule, external, and semantic scoring for one subject at a
/// time. Holds no mutable state between invocations; every `decide` call is
/// independent.
pub struct DecisionEngine {
    rules: RuleEngine,
    aggregator: ExternalAggregator,
    assessor: SemanticAssessor,
    combiner: ScoreCombiner,
    subjects: Arc<dyn SubjectStore>,
    decisions: Arc<dyn DecisionStore>,
    config: RuntimeConfig,
}

/// Builder for [`DecisionEngine`]. The semantic provider is the only
/// required input; verification defaults to the offline heuristics and
/// storage defaults to a fresh in-memory store.
pub struct DecisionEngineBuilder {
    semantic_provider: Arc<dyn SemanticProvider>,
    verification_providers: Option<Vec<Arc<dyn VerificationProvider>>>,
    subject_store: Option<Arc<dyn SubjectStore>>,
    decision_store: Option<Arc<dyn DecisionStore>>,
    config: RuntimeConfig,
}

impl DecisionEngineBuilder {
    pub fn new(semantic_provider: Arc<dyn SemanticProvider>) -> Self {
        Self {
            semantic_provider,
            verification_providers: None,
            subject_store: None,
            decision_store: None,
            config: RuntimeConfig::default(),
        }
    }

    pub fn verification_providers(
        mut self,
        providers: Vec<Arc<dyn VerificationProvider>>,
    ) -> Self {
        self.verification_providers = Some(providers);
        self
    }

    pub fn subject_store(mut self, store: Arc<dyn SubjectStore>) -> Self {
        self.subject_store = Some(store);
        self
    }

    pub fn decision_store(mut self, store: Arc<dyn DecisionStore>) -> Self {
        self.decision_store = Some(store);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> DecisionEngine {
        // Misconfigured weights are worth a warning at startup, not a crash
        // mid-run.
        self.config.scoring.check_invariants();

        let providers = self
            .verification_providers
            .unwrap_or_else(HeuristicProvider::full_set);

        let memory = MemoryStore::new();
        let subjects = self
            .subject_store
            .unwrap_or_else(|| Arc::new(memory.clone()));
        let decisions = self
            .decision_store
            .unwrap_or_else(|| Arc::new(memory));

        DecisionEngine {
            rules: RuleEngine::new(),
            aggregator: ExternalAggregator::new(providers, self.config.clone()),
            assessor: SemanticAssessor::new(self.semantic_provider, self.config.clone()),
            combiner: ScoreCombiner::new(self.config.scoring.clone()),
            subjects,
            decisions,
            config: self.config,
        }
    }
}

impl DecisionEngine {
    pub fn builder(semantic_provider: Arc<dyn SemanticProvider>) -> DecisionEngineBuilder {
        DecisionEngineBuilder::new(semantic_provider)
    }

    /// The scoring configuration in effect, read-only.
    pub fn configuration(&self) -> &ScoringConfig {
        self.combiner.config()
    }

    pub fn runtime_config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Score a subject by id and persist the outcome.
    pub async fn decide(&self, subject_id: &str) -> Result<DecisionRecord, EngineError> {
        let subject = self
            .subjects
            .get(subject_id)
            .await?
            .ok_or_else(|| EngineError::SubjectNotFound(subject_id.to_string()))?;

        self.decide_subject(&subject).await
    }

    /// Score an already-resolved subject and persist the outcome.
    pub async fn decide_subject(&self, subject: &Subject) -> Result<DecisionRecord, EngineError> {
        if !subject.is_structurally_valid() {
            return Err(EngineError::InvalidSubject(subject.id.clone()));
        }

        let started = Instant::now();

        // Rule findings feed the semantic prompt; external runs alongside.
        let ((rule, semantic), external) = tokio::join!(
            async {
                let rule = self.rules.evaluate(subject);
                let semantic = self.assessor.assess(subject, Some(&rule)).await;
                (rule, semantic)
            },
            self.aggregator.verify(subject),
        );

        let combined = self
            .combiner
            .combine(&rule, &external.partial, &semantic.partial);

        let mut api_calls = external.api_calls;
        if !semantic.cache_hit {
            api_calls += 1;
        }

        let errors = [&rule, &external.partial, &semantic.partial]
            .iter()
            .filter_map(|p| p.error.as_ref().map(|e| format!("{}: {}", p.source, e)))
            .collect();

        let metrics = ProcessingMetrics {
            rule_latency_ms: rule.latency_ms,
            external_latency_ms: external.partial.latency_ms,
            semantic_latency_ms: semantic.partial.latency_ms,
            total_latency_ms: started.elapsed().as_millis() as u64,
            api_calls_count: api_calls,
            errors,
        };

        let record = DecisionRecord {
            subject_id: subject.id.clone(),
            final_score: combined.final_score,
            decision: combined.decision,
            confidence: combined.confidence,
            breakdown: combined.breakdown,
            partial_results: vec![rule, external.partial, semantic.partial],
            metrics,
            evaluated_at: Utc::now(),
        };

        self.decisions.store_record(&record).await?;
        self.decisions
            .update_status(&record.subject_id, record.decision.subject_status())
            .await?;

        tracing::info!(
            subject_id = %record.subject_id,
            final_score = record.final_score,
            confidence = record.confidence,
            decision = ?record.decision,
            "decision recorded"
        );

        Ok(record)
    }
}
