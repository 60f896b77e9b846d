//! Relational store trait definition.

use async_trait::async_trait;

use crate::errors::StoreError;
use dataset_pipeline_shared::Dataset;

/// Abstract interface for the relational store holding the raw dataset.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Replace the named table with the contents of `dataset`.
    ///
    /// Any existing table of that name is dropped and recreated; rows are never
    /// appended or merged. Implementations must not leave a partially written
    /// table behind when this fails.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of rows written
    /// * `Err(StoreError::ConnectionError)` - If the store is unreachable
    /// * `Err(StoreError::InvalidSchema)` - If the columns cannot form a table
    async fn replace_table(&self, table: &str, dataset: &Dataset) -> Result<u64, StoreError>;

    /// Read the whole named table, preserving stored column order.
    ///
    /// # Returns
    ///
    /// * `Ok(Dataset)` - Every row of the table
    /// * `Err(StoreError::TableNotFound)` - If the table does not exist
    /// * `Err(StoreError::ConnectionError)` - If the store is unreachable
    async fn read_table(&self, table: &str) -> Result<Dataset, StoreError>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> Result<bool, StoreError>;
}
