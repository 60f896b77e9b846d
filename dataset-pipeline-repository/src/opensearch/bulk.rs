//! Bulk request bodies and response accounting.

use opensearch::http::request::JsonBody;
use serde_json::{json, Value};

use crate::errors::SearchError;
use crate::types::{BulkFailure, BulkIndexSummary};
use dataset_pipeline_shared::SearchDocument;

/// Build the NDJSON body of a bulk request: one action line and one source
/// line per document.
pub(crate) fn build_body(documents: &[SearchDocument]) -> Vec<JsonBody<Value>> {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
    for doc in documents {
        body.push(json!({"index": {"_index": doc.index, "_id": doc.id}}).into());
        body.push(Value::Object(doc.body.clone()).into());
    }
    body
}

/// Count accepted and rejected documents in a bulk response.
///
/// Items are matched to documents by position. A document without a
/// corresponding item is counted as failed, so every submitted document is
/// accounted for.
pub(crate) fn summarize_response(
    documents: &[SearchDocument],
    response: &Value,
) -> Result<BulkIndexSummary, SearchError> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::parse("bulk response has no items array"))?;

    let mut summary = BulkIndexSummary {
        total: documents.len(),
        ..Default::default()
    };

    for (position, doc) in documents.iter().enumerate() {
        // Each item is an object keyed by the action name.
        let result = items
            .get(position)
            .and_then(Value::as_object)
            .and_then(|item| item.values().next());

        let Some(result) = result else {
            summary.failures.push(BulkFailure {
                document_id: doc.id.clone(),
                status: None,
                reason: "missing from bulk response".to_string(),
            });
            continue;
        };

        let status = result
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok());

        match result.get("error") {
            Some(error) => summary.failures.push(BulkFailure {
                document_id: item_id(result).unwrap_or_else(|| doc.id.clone()),
                status,
                reason: error_reason(error),
            }),
            None if status.is_some_and(|s| s >= 300) => summary.failures.push(BulkFailure {
                document_id: item_id(result).unwrap_or_else(|| doc.id.clone()),
                status,
                reason: format!("unexpected item status {}", status.unwrap_or_default()),
            }),
            None => summary.succeeded += 1,
        }
    }

    Ok(summary)
}

/// Mark every document of a chunk as failed for the same reason.
pub(crate) fn fail_all(
    documents: &[SearchDocument],
    status: Option<u16>,
    reason: &str,
) -> BulkIndexSummary {
    BulkIndexSummary {
        total: documents.len(),
        succeeded: 0,
        failures: documents
            .iter()
            .map(|doc| BulkFailure {
                document_id: doc.id.clone(),
                status,
                reason: reason.to_string(),
            })
            .collect(),
    }
}

fn item_id(result: &Value) -> Option<String> {
    match result.get("_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn error_reason(error: &Value) -> String {
    match error {
        Value::String(reason) => reason.clone(),
        Value::Object(fields) => {
            let kind = fields.get("type").and_then(Value::as_str).unwrap_or("error");
            match fields.get("reason").and_then(Value::as_str) {
                Some(reason) => format!("{}: {}", kind, reason),
                None => kind.to_string(),
            }
        }
        other => other.to_string(),
    }
}
