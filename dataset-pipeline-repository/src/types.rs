//! Request and response types for repository operations.

/// A document the search engine refused during a bulk operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    /// Identifier of the rejected document.
    pub document_id: String,
    /// HTTP status reported for the item, if the engine returned one.
    pub status: Option<u16>,
    /// Reason given by the engine, or the transport error.
    pub reason: String,
}

/// Outcome of a bulk index operation.
///
/// Every submitted document is accounted for exactly once, either in
/// `succeeded` or in `failures`, so callers can handle partial failures
/// without losing track of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkIndexSummary {
    /// Total number of documents submitted.
    pub total: usize,
    /// Number of documents the engine accepted.
    pub succeeded: usize,
    /// Documents the engine rejected.
    pub failures: Vec<BulkFailure>,
}

impl BulkIndexSummary {
    /// Number of rejected documents.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BulkIndexSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failures.extend(other.failures);
    }
}
