//! In-memory collaborators for stage tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use dataset_pipeline_repository::{
    BulkFailure, BulkIndexSummary, RelationalStore, SearchEngineClient, SearchError, StoreError,
};
use dataset_pipeline_shared::{Dataset, SearchDocument};

/// Relational store backed by a map of table name to dataset.
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Dataset>>,
    reachable: bool,
    healthy: bool,
    replace_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            reachable: true,
            healthy: true,
            replace_calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            healthy: false,
            ..Self::new()
        }
    }

    /// Answers queries but reports itself unhealthy.
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    pub fn table(&self, name: &str) -> Option<Dataset> {
        self.tables.lock().unwrap().get(name).cloned()
    }

    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }

    fn ensure_reachable(&self) -> Result<(), StoreError> {
        if self.reachable {
            Ok(())
        } else {
            Err(StoreError::connection("connection refused"))
        }
    }
}

#[async_trait]
impl RelationalStore for MemoryStore {
    async fn replace_table(&self, table: &str, dataset: &Dataset) -> Result<u64, StoreError> {
        self.ensure_reachable()?;
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        self.tables
            .lock()
            .unwrap()
            .insert(table.to_string(), dataset.clone());
        Ok(dataset.len() as u64)
    }

    async fn read_table(&self, table: &str) -> Result<Dataset, StoreError> {
        self.ensure_reachable()?;
        self.table(table)
            .ok_or_else(|| StoreError::table_not_found(table))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        self.ensure_reachable()?;
        Ok(self.healthy)
    }
}

/// Search client that records submitted documents and rejects chosen ids.
pub struct MemorySearchClient {
    submitted: Mutex<Vec<SearchDocument>>,
    rejected_ids: HashSet<String>,
    reachable: bool,
}

impl MemorySearchClient {
    pub fn new() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            rejected_ids: HashSet::new(),
            reachable: true,
        }
    }

    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            rejected_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::new()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn submitted(&self) -> Vec<SearchDocument> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchEngineClient for MemorySearchClient {
    async fn bulk_index(
        &self,
        documents: &[SearchDocument],
    ) -> Result<BulkIndexSummary, SearchError> {
        if !self.reachable {
            return Err(SearchError::connection("connection refused"));
        }
        self.submitted
            .lock()
            .unwrap()
            .extend(documents.iter().cloned());

        let failures: Vec<BulkFailure> = documents
            .iter()
            .filter(|doc| self.rejected_ids.contains(&doc.id))
            .map(|doc| BulkFailure {
                document_id: doc.id.clone(),
                status: Some(400),
                reason: "mapper_parsing_exception: failed to parse".to_string(),
            })
            .collect();

        Ok(BulkIndexSummary {
            total: documents.len(),
            succeeded: documents.len() - failures.len(),
            failures,
        })
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        if self.reachable {
            Ok(true)
        } else {
            Err(SearchError::connection("connection refused"))
        }
    }
}
