//! OpenSearch implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! using OpenSearch as the backend. The bulk API it speaks is shared with
//! Elasticsearch.

mod bulk;
mod client;

pub use client::OpenSearchClient;
