//! Indexer stage.
//!
//! Bulk-indexes the clean artifact into the search engine. Documents the
//! engine rejects are counted and logged; they do not fail the stage.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::artifact;
use crate::errors::PipelineError;
use dataset_pipeline_repository::{BulkFailure, SearchEngineClient};
use dataset_pipeline_shared::{Dataset, SearchDocument};

/// Configuration for the indexer.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Clean artifact to read.
    pub input_path: PathBuf,
    /// Target index name.
    pub index_name: String,
}

/// Outcome of an index run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub index_name: String,
    pub submitted: usize,
    pub succeeded: usize,
    pub failures: Vec<BulkFailure>,
}

impl IndexReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for IndexReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Successfully uploaded {} documents", self.succeeded)?;
        write!(f, "Failed to upload {} documents", self.failed())
    }
}

/// Build one document per record. Document ids are 1-based row positions.
pub fn build_documents(index_name: &str, dataset: &Dataset) -> Vec<SearchDocument> {
    dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(position, row)| {
            SearchDocument::from_record(index_name, position, dataset.columns(), row)
        })
        .collect()
}

/// Stage that submits the clean artifact to the search engine.
pub struct Indexer {
    client: Arc<dyn SearchEngineClient>,
    config: IndexerConfig,
}

impl Indexer {
    pub fn new(client: Arc<dyn SearchEngineClient>, config: IndexerConfig) -> Self {
        Self { client, config }
    }

    /// Run the stage.
    ///
    /// # Errors
    ///
    /// * `PipelineError::ConnectionError` - The engine fails its health check
    /// * `PipelineError::FormatError` - The clean artifact is missing or malformed
    #[instrument(skip(self), fields(input = %self.config.input_path.display(), index = %self.config.index_name))]
    pub async fn run(&self) -> Result<IndexReport, PipelineError> {
        let healthy = self
            .client
            .health_check()
            .await
            .map_err(|e| PipelineError::connection(e.to_string()))?;
        if !healthy {
            return Err(PipelineError::connection(
                "search engine did not pass its health check",
            ));
        }

        let dataset = artifact::read_dataset(&self.config.input_path)?;
        let documents = build_documents(&self.config.index_name, &dataset);
        debug!(count = documents.len(), "Built documents");

        let summary = self.client.bulk_index(&documents).await?;

        if !summary.failures.is_empty() {
            for failure in &summary.failures {
                debug!(
                    document_id = %failure.document_id,
                    status = ?failure.status,
                    reason = %failure.reason,
                    "Document rejected"
                );
            }
            warn!(
                failed = summary.failed(),
                succeeded = summary.succeeded,
                "Some documents were not indexed"
            );
        }

        info!(
            submitted = documents.len(),
            succeeded = summary.succeeded,
            failed = summary.failed(),
            "Indexed dataset"
        );

        Ok(IndexReport {
            index_name: self.config.index_name.clone(),
            submitted: documents.len(),
            succeeded: summary.succeeded,
            failures: summary.failures,
        })
    }
}
