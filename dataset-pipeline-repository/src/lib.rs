//! # Dataset Pipeline Repository
//!
//! This crate provides traits and implementations for the pipeline's two
//! external collaborators: the relational store that holds the raw dataset
//! and the search engine the clean dataset is indexed into. It includes
//! definitions for errors, interfaces, and concrete implementations for
//! PostgreSQL and OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;
pub mod types;

pub use config::{BulkConfig, StoreConfig};
pub use errors::{SearchError, StoreError};
pub use interfaces::{RelationalStore, SearchEngineClient};
pub use opensearch::OpenSearchClient;
pub use postgres::PostgresStore;
pub use types::{BulkFailure, BulkIndexSummary};
