//! # Dataset Pipeline
//!
//! Configuration, dependency wiring and the top-level error for the
//! dataset pipeline binary.

pub mod config;

pub use config::{Dependencies, PipelineConfig};

use thiserror::Error;

/// Errors that can occur during pipeline initialization or execution.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A stage failed.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] dataset_pipeline_stages::PipelineError),

    /// The relational store could not be set up.
    #[error("Store error: {0}")]
    StoreError(#[from] dataset_pipeline_repository::StoreError),

    /// The search client could not be set up.
    #[error("Search error: {0}")]
    SearchError(#[from] dataset_pipeline_repository::SearchError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
