//! Dependency initialization and wiring for the dataset pipeline.

use std::sync::Arc;
use tracing::info;

use crate::config::PipelineConfig;
use crate::AppError;
use dataset_pipeline_repository::{OpenSearchClient, PostgresStore};
use dataset_pipeline_stages::{
    Cleaner, CleanerConfig, Extractor, ExtractorConfig, Indexer, IndexerConfig, Ingestor,
    IngestorConfig, Orchestrator,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Build the store, the search client and the four stages.
    ///
    /// Neither backend is contacted here. Connectivity is checked by the
    /// stage that needs it, so `clean` runs without either service.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If a URL is invalid
    pub fn new(config: &PipelineConfig) -> Result<Self, AppError> {
        info!(
            opensearch_url = %config.opensearch_url,
            table = %config.table_name,
            index = %config.index_name,
            source = %config.source_path.display(),
            "Initializing dependencies"
        );

        let store = Arc::new(PostgresStore::connect_lazy(&config.database_url, &config.store)?);
        let search_client = Arc::new(OpenSearchClient::new(
            &config.opensearch_url,
            config.bulk.clone(),
        )?);

        let ingestor = Ingestor::new(
            store.clone(),
            IngestorConfig {
                source_path: config.source_path.clone(),
                table_name: config.table_name.clone(),
            },
        );
        let extractor = Extractor::new(
            store,
            ExtractorConfig {
                table_name: config.table_name.clone(),
                output_path: config.extract_path.clone(),
            },
        );
        let cleaner = Cleaner::new(CleanerConfig {
            input_path: config.extract_path.clone(),
            output_path: config.clean_path.clone(),
            id_assignment: config.id_assignment,
        });
        let indexer = Indexer::new(
            search_client,
            IndexerConfig {
                input_path: config.clean_path.clone(),
                index_name: config.index_name.clone(),
            },
        );

        let orchestrator = Orchestrator::new(ingestor, extractor, cleaner, indexer);

        Ok(Self { orchestrator })
    }
}
