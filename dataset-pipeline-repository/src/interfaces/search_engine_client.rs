//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::BulkIndexSummary;
use dataset_pipeline_shared::SearchDocument;

/// Abstract interface for search engine operations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Rejected documents are reported inside [`BulkIndexSummary`]; only failures
/// that prevent the operation from running at all are returned as `Err`.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Index documents through the bulk API.
    ///
    /// Each document carries its own target index and id. A document that
    /// already exists under the same id is replaced.
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents to index, in submission order
    ///
    /// # Returns
    ///
    /// * `Ok(BulkIndexSummary)` - Accepted count and per-document failures
    /// * `Err(SearchError)` - If the operation could not be attempted
    ///
    /// # Example
    ///
    /// ```ignore
    /// let summary = client.bulk_index(&documents).await?;
    /// println!("{} indexed, {} failed", summary.succeeded, summary.failed());
    /// ```
    async fn bulk_index(&self, documents: &[SearchDocument])
        -> Result<BulkIndexSummary, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine answered but reported itself unhealthy
    /// * `Err(SearchError)` - If the search engine could not be reached
    async fn health_check(&self) -> Result<bool, SearchError>;
}
