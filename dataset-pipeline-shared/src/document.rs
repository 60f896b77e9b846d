//! Search document type.

use serde_json::{Map, Value};

use crate::dataset::CellValue;

/// One document submitted to the search engine.
///
/// A document is the `{index, id, body}` triple of a bulk index action. The
/// body holds every field of the source record.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    /// Target index name.
    pub index: String,
    /// Document identifier within the index.
    pub id: String,
    /// Field mapping of the record.
    pub body: Map<String, Value>,
}

impl SearchDocument {
    /// Build the document for the record at `position` (0-based) of a dataset.
    ///
    /// The document id is the 1-based row position.
    pub fn from_record(
        index: impl Into<String>,
        position: usize,
        columns: &[String],
        row: &[CellValue],
    ) -> Self {
        let body = columns
            .iter()
            .zip(row)
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect();

        Self {
            index: index.into(),
            id: (position + 1).to_string(),
            body,
        }
    }
}
