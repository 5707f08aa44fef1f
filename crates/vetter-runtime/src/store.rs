//! Storage seams for subjects and decision records.
//!
//! The engine talks to traits, not concrete stores. [`MemoryStore`] backs the
//! CLI and tests; a real deployment would implement the same traits over its
//! own persistence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use vetter_core::{DecisionRecord, Subject, SubjectStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Read access to the subjects under evaluation.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Subject>, StoreError>;
}

/// Write access for decision outcomes.
#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn store_record(&self, record: &DecisionRecord) -> Result<(), StoreError>;

    async fn update_status(&self, subject_id: &str, status: SubjectStatus)
        -> Result<(), StoreError>;
}

/// In-memory store over `parking_lot` locks. Clones share state.
#[derive(Default, Clone)]
pub struct MemoryStore {
    subjects: Arc<RwLock<HashMap<String, Subject>>>,
    records: Arc<RwLock<Vec<DecisionRecord>>>,
    statuses: Arc<RwLock<HashMap<String, SubjectStatus>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_subject(&self, subject: Subject) {
        self.subjects.write().insert(subject.id.clone(), subject);
    }

    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records.read().clone()
    }

    pub fn status_of(&self, subject_id: &str) -> Option<SubjectStatus> {
        self.statuses.read().get(subject_id).copied()
    }
}

#[async_trait]
impl SubjectStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Subject>, StoreError> {
        Ok(self.subjects.read().get(id).cloned())
    }
}

#[async_trait]
impl DecisionStore for MemoryStore {
    async fn store_record(&self, record: &DecisionRecord) -> Result<(), StoreError> {
        self.records.write().push(record.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        subject_id: &str,
        status: SubjectStatus,
    ) -> Result<(), StoreError> {
        self.statuses.write().insert(subject_id.to_string(), status);
        Ok(())
    }
}
