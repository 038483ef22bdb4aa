//! Wire-level tests for the HTTP object store client
//!
//! Uses wiremock to stand in for the storage backend and asserts on the
//! requests the client actually sends.

use pubsub_relay::archive::{ArchiveWriter, HttpObjectStore, ObjectStore, ARCHIVE_CONTENT_TYPE};
use pubsub_relay::protocol::PubSubMessage;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message(topic: &str, payload: &str) -> PubSubMessage {
    let mut attributes = serde_json::Map::new();
    attributes.insert("payload".to_string(), json!(payload));
    PubSubMessage {
        topic: topic.to_string(),
        attributes,
    }
}

#[tokio::test]
async fn test_put_issues_put_with_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/archive/record-1"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpObjectStore::new(&server.uri(), "archive", None);
    store
        .put("record-1", br#"[{"topic":"a"}]"#.to_vec(), "application/json")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_put_sends_bearer_token_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/archive/record-1"))
        .and(header("authorization", "Bearer store-secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpObjectStore::new(&server.uri(), "archive", Some("store-secret".to_string()));
    store
        .put("record-1", b"{}".to_vec(), "application/json")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_put_surfaces_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = HttpObjectStore::new(&server.uri(), "archive", None);
    let result = store.put("record-1", b"{}".to_vec(), "application/json").await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_put_surfaces_connection_failure() {
    // Nothing listens on this port
    let store = HttpObjectStore::new("http://127.0.0.1:1", "archive", None);
    let result = store.put("record-1", b"{}".to_vec(), "application/json").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_writer_stores_batch_under_uuid_key() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/archive/[0-9a-f-]{36}$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(HttpObjectStore::new(&server.uri(), "archive", None));
    let writer = ArchiveWriter::new(store);

    let messages = vec![message("devices/metadata/1", "a")];
    let key = writer.write_batch(&messages).await.unwrap();
    assert!(Uuid::parse_str(&key).is_ok());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), format!("/archive/{key}"));
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        ARCHIVE_CONTENT_TYPE
    );

    let stored: Vec<PubSubMessage> = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(stored, messages);
}

#[tokio::test]
async fn test_writer_generates_distinct_keys_per_write() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = Arc::new(HttpObjectStore::new(&server.uri(), "archive", None));
    let writer = ArchiveWriter::new(store);

    let messages = vec![message("devices/metadata/1", "a")];
    let first = writer.write_batch(&messages).await.unwrap();
    let second = writer.write_batch(&messages).await.unwrap();
    assert_ne!(first, second);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].url.path(), requests[1].url.path());
}
