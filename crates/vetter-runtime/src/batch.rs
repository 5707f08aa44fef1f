//! Batch scoring over the decision engine.
//!
//! Subjects run in chunks of the configured concurrency limit: members of a
//! chunk run concurrently, chunks run sequentially, so no more than `limit`
//! subjects are ever in flight. A failed subject is captured as a failed item
//! and, by default, does not stop the rest of the batch.

use futures::future::join_all;
use vetter_core::DecisionRecord;

use crate::engine::{DecisionEngine, EngineError};

/// Per-batch options.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum subjects in flight at once. `None` uses the runtime default.
    pub concurrency_limit: Option<usize>,

    /// When false, stop scheduling new chunks after the first failure.
    /// In-flight members of the failing chunk still settle.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: None,
            continue_on_error: true,
        }
    }
}

/// One subject's outcome within a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub subject_id: String,
    pub result: Result<DecisionRecord, EngineError>,
}

/// Aggregate outcome of a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

impl DecisionEngine {
    /// Score a list of subjects by id under a concurrency limit.
    pub async fn decide_many(&self, subject_ids: &[String], options: BatchOptions) -> BatchOutcome {
        let limit = options
            .concurrency_limit
            .unwrap_or(self.runtime_config().default_concurrency)
            .max(1);

        let mut items = Vec::with_capacity(subject_ids.len());

        for chunk in subject_ids.chunks(limit) {
            let runs = chunk.iter().map(|id| async move {
                BatchItem {
                    subject_id: id.clone(),
                    result: self.decide(id).await,
                }
            });
            let settled = join_all(runs).await;

            let chunk_failed = settled.iter().any(|item| item.result.is_err());
            items.extend(settled);

            if chunk_failed && !options.continue_on_error {
                tracing::warn!(
                    processed = items.len(),
                    total = subject_ids.len(),
                    "batch aborted on first failure"
                );
                break;
            }
        }

        let successful = items.iter().filter(|i| i.result.is_ok()).count();
        let failed = items.len() - successful;

        tracing::info!(
            total = subject_ids.len(),
            successful,
            failed,
            "batch complete"
        );

        BatchOutcome {
            total: subject_ids.len(),
            successful,
            failed,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderError, SemanticPayload, SemanticProvider};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use vetter_core::{ContactChannels, Subject};

    struct StubSemantic;

    #[async_trait]
    impl SemanticProvider for StubSemantic {
        async fn assess(
            &self,
            _subject: &Subject,
            _rule_context: Option<&str>,
        ) -> Result<SemanticPayload, ProviderError> {
            Ok(SemanticPayload {
                score: Some(80.0),
                confidence: Some(75.0),
                reasoning: None,
                recommendation: None,
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn subject(id: &str, name: &str) -> Subject {
        Subject {
            id: id.to_string(),
            full_name: name.to_string(),
            company_name: "Acme".to_string(),
            contact: ContactChannels {
                email: Some("jane@acme.com".to_string()),
                phone: None,
            },
            role: None,
            industry: None,
            website: None,
        }
    }

    fn engine(store: &MemoryStore) -> DecisionEngine {
        DecisionEngine::builder(Arc::new(StubSemantic))
            .subject_store(Arc::new(store.clone()))
            .decision_store(Arc::new(store.clone()))
            .build()
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let store = MemoryStore::new();
        store.insert_subject(subject("a", "Jane Doe"));
        let mut invalid = subject("b", "");
        invalid.company_name = String::new();
        store.insert_subject(invalid);
        store.insert_subject(subject("c", "John Roe"));

        let outcome = engine(&store)
            .decide_many(
                &ids(&["a", "b", "c"]),
                BatchOptions {
                    concurrency_limit: Some(2),
                    continue_on_error: true,
                },
            )
            .await;

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.successful, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.items.len(), 3);

        let failed = outcome.items.iter().find(|i| i.subject_id == "b").unwrap();
        assert!(matches!(
            failed.result,
            Err(EngineError::InvalidSubject(_))
        ));
    }

    #[tokio::test]
    async fn test_abort_on_error_stops_after_failing_chunk() {
        let store = MemoryStore::new();
        store.insert_subject(subject("a", "Jane Doe"));
        store.insert_subject(subject("c", "John Roe"));
        // "b" is never inserted, so it fails as not-found.

        let outcome = engine(&store)
            .decide_many(
                &ids(&["a", "b", "c"]),
                BatchOptions {
                    concurrency_limit: Some(2),
                    continue_on_error: false,
                },
            )
            .await;

        // The first chunk (a, b) settles; c is never scheduled.
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.successful, 1);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn test_zero_limit_is_treated_as_one() {
        let store = MemoryStore::new();
        store.insert_subject(subject("a", "Jane Doe"));

        let outcome = engine(&store)
            .decide_many(
                &ids(&["a"]),
                BatchOptions {
                    concurrency_limit: Some(0),
                    continue_on_error: true,
                },
            )
            .await;

        assert_eq!(outcome.successful, 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let store = MemoryStore::new();
        let outcome = engine(&store)
            .decide_many(&[], BatchOptions::default())
            .await;
        assert_eq!(outcome.total, 0);
        assert!(outcome.items.is_empty());
    }
}
