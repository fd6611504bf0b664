//! HTTP-level tests for the Assistants client against a mock server.

use docbot_client::{
    AssistantsClient, BatchStatus, Error, RunStatus, Tool, ToolResources, UpdateAssistantRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AssistantsClient {
    AssistantsClient::builder()
        .api_key("sk-test")
        .base_url(format!("{}/v1", server.uri()))
        .build()
        .unwrap()
}

fn error_body(message: &str, kind: &str) -> serde_json::Value {
    json!({ "error": { "message": message, "type": kind, "param": null, "code": null } })
}

#[tokio::test]
async fn test_retrieve_missing_assistant_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/assistants/asst_X"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body(
            "No assistant found with id 'asst_X'.",
            "invalid_request_error",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .assistants()
        .retrieve("asst_X")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rejected_key_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body(
            "Incorrect API key provided.",
            "invalid_request_error",
        )))
        .mount(&server)
        .await;

    let err = client_for(&server).models().list().await.unwrap_err();
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_server_error_without_body_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .threads()
        .retrieve("thread_1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 503, .. }));
    assert!(err.is_retryable());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_create_run_sends_beta_header_and_file_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/threads/thread_1/runs"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("openai-beta", "assistants=v2"))
        .and(body_json(json!({
            "assistant_id": "asst_1",
            "tools": [{ "type": "file_search" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "run_1",
            "object": "thread.run",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": "queued",
            "created_at": 1_700_000_000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .runs()
        .create("thread_1", "asst_1")
        .await
        .unwrap();

    assert_eq!(run.id, "run_1");
    assert_eq!(run.status, RunStatus::Queued);
    assert!(run.completed_at.is_none());
}

#[tokio::test]
async fn test_list_all_messages_follows_cursor() {
    let server = MockServer::start().await;

    let message = |id: &str, text: &str| {
        json!({
            "id": id,
            "thread_id": "thread_1",
            "role": "user",
            "content": [{ "type": "text", "text": { "value": text, "annotations": [] } }],
            "created_at": 1
        })
    };

    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_1/messages"))
        .and(query_param("after", "msg_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [message("msg_3", "three")],
            "first_id": "msg_3",
            "last_id": "msg_3",
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_1/messages"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [message("msg_1", "one"), message("msg_2", "two")],
            "first_id": "msg_1",
            "last_id": "msg_2",
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let messages = client_for(&server)
        .messages()
        .list_all("thread_1")
        .await
        .unwrap();

    let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["msg_1", "msg_2", "msg_3"]);
    assert_eq!(messages[2].text(), "three");
}

#[tokio::test]
async fn test_upload_file_is_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file_1",
            "object": "file",
            "bytes": 5,
            "created_at": 1,
            "filename": "notes.txt",
            "purpose": "assistants"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "hello").unwrap();

    let uploaded = client_for(&server).files().upload(&file).await.unwrap();
    assert_eq!(uploaded.id, "file_1");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn test_upload_missing_file_fails_locally() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .files()
        .upload(std::path::Path::new("/nonexistent/file.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[tokio::test]
async fn test_update_assistant_binds_vector_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/assistants/asst_1"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "instructions": "Be brief.",
            "tools": [{ "type": "file_search" }],
            "tool_resources": { "file_search": { "vector_store_ids": ["vs_1"] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asst_1",
            "object": "assistant",
            "name": "Doc Bot",
            "model": "gpt-4o-mini",
            "instructions": "Be brief.",
            "tools": [{ "type": "file_search" }],
            "tool_resources": { "file_search": { "vector_store_ids": ["vs_1"] } },
            "created_at": 1_700_000_000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = UpdateAssistantRequest {
        model: Some("gpt-4o-mini".to_string()),
        instructions: Some("Be brief.".to_string()),
        tools: Some(vec![Tool::file_search()]),
        tool_resources: Some(ToolResources::vector_store("vs_1")),
    };
    let assistant = client_for(&server)
        .assistants()
        .update("asst_1", &request)
        .await
        .unwrap();

    assert_eq!(assistant.display_name(), "Doc Bot");
    assert_eq!(
        assistant.tool_resources,
        Some(ToolResources::vector_store("vs_1"))
    );
}

#[tokio::test]
async fn test_file_batch_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/vector_stores/vs_1/file_batches"))
        .and(body_json(json!({ "file_ids": ["file_1", "file_2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vsfb_1",
            "object": "vector_store.file_batch",
            "vector_store_id": "vs_1",
            "status": "in_progress",
            "file_counts": { "in_progress": 2, "completed": 0, "failed": 0, "cancelled": 0, "total": 2 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores/vs_1/file_batches/vsfb_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vsfb_1",
            "vector_store_id": "vs_1",
            "status": "completed",
            "file_counts": { "in_progress": 0, "completed": 2, "failed": 0, "cancelled": 0, "total": 2 }
        })))
        .mount(&server)
        .await;

    let stores = client_for(&server).vector_stores();
    let batch = stores
        .create_file_batch("vs_1", vec!["file_1".to_string(), "file_2".to_string()])
        .await
        .unwrap();
    assert_eq!(batch.status, BatchStatus::InProgress);

    let batch = stores.retrieve_file_batch("vs_1", &batch.id).await.unwrap();
    assert_eq!(batch.status, BatchStatus::Completed);
    assert_eq!(batch.file_counts.completed, 2);
}

#[tokio::test]
async fn test_listings_and_deletions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores/vs_1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{ "id": "file_1", "usage_bytes": 2048, "status": "completed" }],
            "has_more": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_1/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{
                "id": "run_1",
                "thread_id": "thread_1",
                "assistant_id": "asst_1",
                "status": "expired",
                "created_at": 1
            }],
            "has_more": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/files/file_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "file_1", "object": "file", "deleted": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/vector_stores/vs_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "id": "vs_1", "object": "vector_store.deleted", "deleted": true }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let files = client.vector_stores().files("vs_1").await.unwrap();
    assert_eq!(files.data[0].usage_bytes, 2048);

    let runs = client.runs().list("thread_1").await.unwrap();
    assert_eq!(runs.data[0].status, RunStatus::Expired);
    assert!(runs.data[0].status.is_terminal());

    assert!(client.files().delete("file_1").await.unwrap().deleted);
    assert!(client.vector_stores().delete("vs_1").await.unwrap().deleted);
}
