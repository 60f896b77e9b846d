//! Ingestor stage.
//!
//! Loads the source file into the relational store, replacing any table of
//! the same name.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::artifact;
use crate::errors::PipelineError;
use dataset_pipeline_repository::RelationalStore;

/// Configuration for the ingestor.
#[derive(Debug, Clone)]
pub struct IngestorConfig {
    /// Source dataset file.
    pub source_path: PathBuf,
    /// Table the dataset is written to.
    pub table_name: String,
}

/// Outcome of an ingest run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub source_path: PathBuf,
    pub table_name: String,
    /// Records read from the source and written to the table.
    pub records: usize,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loaded {} records into the relational store from {}.",
            self.records,
            self.source_path.display()
        )
    }
}

/// Stage that writes the raw source dataset into the relational store.
///
/// Column names are written verbatim; no cleaning happens here.
pub struct Ingestor {
    store: Arc<dyn RelationalStore>,
    config: IngestorConfig,
}

impl Ingestor {
    pub fn new(store: Arc<dyn RelationalStore>, config: IngestorConfig) -> Self {
        Self { store, config }
    }

    /// Run the stage.
    ///
    /// The source file is parsed completely before the store is touched, so
    /// a missing or malformed file leaves any previous table intact.
    ///
    /// # Errors
    ///
    /// * `PipelineError::FormatError` - The source file is missing or unparseable
    /// * `PipelineError::ConnectionError` - The store is unreachable
    #[instrument(skip(self), fields(source = %self.config.source_path.display(), table = %self.config.table_name))]
    pub async fn run(&self) -> Result<IngestReport, PipelineError> {
        let dataset = artifact::read_dataset(&self.config.source_path)?;
        info!(
            rows = dataset.len(),
            columns = dataset.width(),
            "Read source dataset"
        );

        let healthy = self
            .store
            .health_check()
            .await
            .map_err(|e| PipelineError::connection(e.to_string()))?;
        if !healthy {
            return Err(PipelineError::connection(
                "relational store did not pass its health check",
            ));
        }

        let written = self
            .store
            .replace_table(&self.config.table_name, &dataset)
            .await?;

        if written != dataset.len() as u64 {
            return Err(PipelineError::store(format!(
                "wrote {} rows to '{}' but the source has {}",
                written,
                self.config.table_name,
                dataset.len()
            )));
        }

        Ok(IngestReport {
            source_path: self.config.source_path.clone(),
            table_name: self.config.table_name.clone(),
            records: dataset.len(),
        })
    }
}
