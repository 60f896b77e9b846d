//! `OpenSearchClient` against a mocked HTTP endpoint.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dataset_pipeline_repository::{BulkConfig, OpenSearchClient, SearchEngineClient, SearchError};
use dataset_pipeline_shared::{CellValue, SearchDocument};

fn documents(count: usize) -> Vec<SearchDocument> {
    let columns = vec!["name".to_string(), "id".to_string()];
    (0..count)
        .map(|position| {
            let row = vec![
                CellValue::from(format!("car {}", position)),
                CellValue::Integer(position as i64 + 1),
            ];
            SearchDocument::from_record("table_m3", position, &columns, &row)
        })
        .collect()
}

fn client(server: &MockServer, chunk_size: usize) -> OpenSearchClient {
    OpenSearchClient::new(&server.uri(), BulkConfig::with_chunk_size(chunk_size)).unwrap()
}

#[tokio::test]
async fn test_partial_failure_is_reported_per_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 3,
            "errors": true,
            "items": [
                {"index": {"_index": "table_m3", "_id": "1", "status": 201}},
                {"index": {
                    "_index": "table_m3",
                    "_id": "2",
                    "status": 400,
                    "error": {"type": "mapper_parsing_exception", "reason": "failed to parse field [id]"}
                }},
                {"index": {"_index": "table_m3", "_id": "3", "status": 200}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let summary = client(&server, 500).bulk_index(&documents(3)).await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].document_id, "2");
    assert_eq!(summary.failures[0].status, Some(400));
    assert_eq!(
        summary.failures[0].reason,
        "mapper_parsing_exception: failed to parse field [id]"
    );
}

#[tokio::test]
async fn test_server_error_fails_whole_chunk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(503).set_body_string("cluster unavailable"))
        .mount(&server)
        .await;

    let summary = client(&server, 500).bulk_index(&documents(4)).await.unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed(), 4);
    assert!(summary.failures.iter().all(|f| f.status == Some(503)));
    assert_eq!(summary.succeeded + summary.failed(), summary.total);
}

#[tokio::test]
async fn test_documents_are_sent_in_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "errors": false,
            "items": [
                {"index": {"status": 201}},
                {"index": {"status": 201}}
            ]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let summary = client(&server, 2).bulk_index(&documents(5)).await.unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.succeeded, 5);
    assert_eq!(summary.failed(), 0);
}

#[tokio::test]
async fn test_unparseable_reply_fails_whole_chunk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .mount(&server)
        .await;

    let summary = client(&server, 500).bulk_index(&documents(2)).await.unwrap();

    assert_eq!(summary.failed(), 2);
    assert!(summary.failures.iter().all(|f| f.status == Some(200)));
}

#[tokio::test]
async fn test_transport_error_fails_whole_chunk() {
    let client = OpenSearchClient::new("http://127.0.0.1:1", BulkConfig::default()).unwrap();

    let summary = client.bulk_index(&documents(2)).await.unwrap();

    assert_eq!(summary.failed(), 2);
    assert!(summary.failures.iter().all(|f| f.status.is_none()));
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client(&server, 500).health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_reports_unhealthy_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!client(&server, 500).health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_on_unreachable_engine() {
    let client = OpenSearchClient::new("http://127.0.0.1:1", BulkConfig::default()).unwrap();

    let result = client.health_check().await;

    assert!(matches!(result, Err(SearchError::ConnectionError(_))));
}
