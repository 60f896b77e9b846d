//! Extractor stage.
//!
//! Reads the whole relational table back out into the intermediate artifact,
//! so that cleaning works purely on files.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::artifact;
use crate::errors::PipelineError;
use dataset_pipeline_repository::RelationalStore;

/// Configuration for the extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Table to read.
    pub table_name: String,
    /// Intermediate artifact to write.
    pub output_path: PathBuf,
}

/// Outcome of an extract run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractReport {
    pub table_name: String,
    pub output_path: PathBuf,
    pub records: usize,
}

impl fmt::Display for ExtractReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Extracted {} records from the relational store to {}.",
            self.records,
            self.output_path.display()
        )
    }
}

/// Stage that materializes the whole table as a delimited file.
pub struct Extractor {
    store: Arc<dyn RelationalStore>,
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(store: Arc<dyn RelationalStore>, config: ExtractorConfig) -> Self {
        Self { store, config }
    }

    /// Run the stage.
    ///
    /// # Errors
    ///
    /// * `PipelineError::ConnectionError` - The store is unreachable
    /// * `PipelineError::QueryError` - The table does not exist
    #[instrument(skip(self), fields(table = %self.config.table_name, output = %self.config.output_path.display()))]
    pub async fn run(&self) -> Result<ExtractReport, PipelineError> {
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

        let dataset = self.store.read_table(&self.config.table_name).await?;
        info!(rows = dataset.len(), columns = dataset.width(), "Read table");

        artifact::write_dataset(&self.config.output_path, &dataset)?;

        Ok(ExtractReport {
            table_name: self.config.table_name.clone(),
            output_path: self.config.output_path.clone(),
            records: dataset.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use dataset_pipeline_repository::RelationalStore;
    use dataset_pipeline_shared::{CellValue, Dataset};
    use std::fs;
    use tempfile::TempDir;

    fn extractor(store: Arc<MemoryStore>, output_path: PathBuf) -> Extractor {
        Extractor::new(
            store,
            ExtractorConfig {
                table_name: "table_m3".to_string(),
                output_path,
            },
        )
    }

    #[tokio::test]
    async fn test_extract_preserves_columns_and_rows() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("extracted.csv");
        let store = Arc::new(MemoryStore::new());
        let dataset = Dataset::from_rows(
            vec!["Zeta".to_string(), "Alpha Col".to_string()],
            vec![
                vec![CellValue::Integer(1), CellValue::from("x")],
                vec![CellValue::Integer(2), CellValue::Null],
            ],
        )
        .unwrap();
        store.replace_table("table_m3", &dataset).await.unwrap();

        let report = extractor(store, output.clone()).run().await.unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "Zeta,Alpha Col\n1,x\n2,\n");
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("extracted.csv");

        let result = extractor(Arc::new(MemoryStore::new()), output.clone()).run().await;

        assert!(matches!(result, Err(PipelineError::QueryError(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unhealthy_store_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("extracted.csv");
        let store = Arc::new(MemoryStore::unhealthy());
        store
            .replace_table("table_m3", &Dataset::new(vec!["a".to_string()]).unwrap())
            .await
            .unwrap();

        let result = extractor(store, output.clone()).run().await;

        assert!(matches!(result, Err(PipelineError::ConnectionError(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let result = extractor(
            Arc::new(MemoryStore::unreachable()),
            dir.path().join("extracted.csv"),
        )
        .run()
        .await;

        assert!(matches!(result, Err(PipelineError::ConnectionError(_))));
    }
}
