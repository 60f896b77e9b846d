//! Error types for the pipeline stages.

use dataset_pipeline_repository::{SearchError, StoreError};
use thiserror::Error;

/// Errors that abort a pipeline stage.
///
/// No stage recovers from these; the orchestrator stops the chain at the
/// first one. Per-document indexing failures are not errors and never
/// appear here.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The relational store or the search engine is unreachable.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An input file is missing or cannot be parsed as a table.
    #[error("Format error: {0}")]
    FormatError(String),

    /// The expected table is absent or a statement was rejected.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The store failed while writing or decoding rows.
    #[error("Store error: {0}")]
    StoreError(String),

    /// The search engine failed outside per-document accounting.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Writing an output artifact failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::FormatError(msg.into())
    }

    /// Create a store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConnectionError(msg) => Self::ConnectionError(msg),
            StoreError::QueryError(msg) => Self::QueryError(msg),
            StoreError::TableNotFound(table) => {
                Self::QueryError(format!("table not found: {}", table))
            }
            StoreError::InvalidSchema(msg) => Self::FormatError(msg),
            StoreError::WriteError(msg) | StoreError::DecodeError(msg) => Self::StoreError(msg),
        }
    }
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::ConnectionError(msg) => Self::ConnectionError(msg),
            other => Self::IndexError(other.to_string()),
        }
    }
}
