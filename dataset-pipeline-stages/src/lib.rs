//! # Dataset Pipeline Stages
//!
//! The four batch stages of the dataset pipeline and the orchestrator that
//! chains them.
//!
//! ## Architecture
//!
//! Stages hand data to each other through durable artifacts:
//!
//! 1. **Ingestor**: Loads the source file into the relational store
//! 2. **Extractor**: Reads the table back out into the intermediate file
//! 3. **Cleaner**: Adds ids, drops duplicates and incomplete rows, normalizes column names
//! 4. **Indexer**: Bulk-indexes the clean file into the search engine
//! 5. **Orchestrator**: Runs the stages in order and halts on the first failure

pub mod artifact;
pub mod cleaner;
pub mod errors;
pub mod extractor;
pub mod indexer;
pub mod ingestor;
pub mod orchestrator;

#[cfg(test)]
mod test_support;

pub use cleaner::{clean, CleanReport, Cleaner, CleanerConfig, CleaningStats, IdAssignment};
pub use errors::PipelineError;
pub use extractor::{ExtractReport, Extractor, ExtractorConfig};
pub use indexer::{IndexReport, Indexer, IndexerConfig};
pub use ingestor::{IngestReport, Ingestor, IngestorConfig};
pub use orchestrator::{Orchestrator, PipelineReport, Stage, StageReport, WorkflowDefinition};
