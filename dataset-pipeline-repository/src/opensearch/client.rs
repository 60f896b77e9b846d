//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::BulkConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::bulk;
use crate::types::BulkIndexSummary;
use dataset_pipeline_shared::SearchDocument;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200", BulkConfig::default())?;
/// let summary = client.bulk_index(&documents).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    config: BulkConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the specified URL.
    ///
    /// No request is sent here; use [`SearchEngineClient::health_check`] to
    /// verify the engine is reachable.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `config` - Bulk request configuration
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If the URL is invalid or transport setup fails
    pub fn new(url: &str, config: BulkConfig) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            chunk_size = config.chunk_size,
            "Created OpenSearch client"
        );

        Ok(Self { client, config })
    }

    /// Send one bulk request and account for every document in it.
    ///
    /// A request that fails as a whole marks the entire chunk as failed
    /// instead of aborting the operation.
    async fn send_chunk(&self, chunk: &[SearchDocument]) -> BulkIndexSummary {
        let response = match self
            .client
            .bulk(BulkParts::None)
            .body(bulk::build_body(chunk))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, count = chunk.len(), "Bulk request failed");
                return bulk::fail_all(chunk, None, &e.to_string());
            }
        };

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request rejected");
            return bulk::fail_all(
                chunk,
                Some(status.as_u16()),
                &format!("bulk request failed with status {}: {}", status, error_body),
            );
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to read bulk response");
                return bulk::fail_all(chunk, Some(status.as_u16()), &e.to_string());
            }
        };

        match bulk::summarize_response(chunk, &body) {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Failed to parse bulk response");
                bulk::fail_all(chunk, Some(status.as_u16()), &e.to_string())
            }
        }
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_index(
        &self,
        documents: &[SearchDocument],
    ) -> Result<BulkIndexSummary, SearchError> {
        let mut summary = BulkIndexSummary::default();

        for chunk in documents.chunks(self.config.chunk_size.max(1)) {
            let chunk_summary = self.send_chunk(chunk).await;
            if chunk_summary.failed() > 0 {
                warn!(
                    failed = chunk_summary.failed(),
                    succeeded = chunk_summary.succeeded,
                    "Bulk chunk had failures"
                );
            } else {
                debug!(count = chunk.len(), "Bulk chunk indexed");
            }
            summary.merge(chunk_summary);
        }

        Ok(summary)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }
}
