use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{self, Request, StatusCode},
    Router,
};
use mockall::mock;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use tasklens_kb::test_utils::FakeEmbeddingService;
use tasklens_kb::{
    EmbeddingGenerator, MemoryStateStore, MockEmbeddingService, RecordId, RequestContext, StateStore,
    StateStoreError, StoredEmbedding, TextRecord,
};
use tasklens_server::{api::build_router, AppState, ServerConfig, ServerError};

// Mock the record store
mock! {
    pub Store {}

    #[async_trait]
    impl StateStore for Store {
        async fn set_embedding(
            &self,
            ctx: &RequestContext,
            record_id: &RecordId,
            embedding: &[f32],
        ) -> Result<bool, StateStoreError>;
        async fn fetch_embeddings(&self, ctx: &RequestContext) -> Result<Vec<StoredEmbedding>, StateStoreError>;
        async fn list_records(&self, ctx: &RequestContext) -> Result<Vec<TextRecord>, StateStoreError>;
        async fn health_check(&self) -> Result<bool, StateStoreError>;
    }
}

fn id(value: &str) -> RecordId {
    RecordId::parse(value).unwrap()
}

fn router_with(store: Arc<dyn StateStore>, generator: Arc<dyn EmbeddingGenerator>) -> Router {
    let state = AppState::new(&ServerConfig::default(), store, generator);
    build_router(Arc::new(state))
}

async fn seeded_store(records: &[(&str, &str)]) -> MemoryStateStore {
    let store = MemoryStateStore::new();
    for (record_id, title) in records {
        store
            .insert_record(TextRecord::new(id(record_id), Some(title.to_string()), None))
            .await;
    }
    store
}

async fn send(app: &Router, method: http::Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, http::Method::POST, uri, Some(body)).await
}

#[test_log::test(tokio::test)]
async fn test_embed_task_stores_embedding() {
    let store = seeded_store(&[("t1", "Buy milk")]).await;
    let app = router_with(Arc::new(store.clone()), Arc::new(MockEmbeddingService::default()));

    let (status, body) = post(
        &app,
        "/embed_task",
        json!({ "recordId": "t1", "title": "Buy milk", "description": "2 liters" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Embedding stored successfully", "recordId": "t1" })
    );
    let embedding = store.embedding_of(&id("t1")).await.unwrap();
    assert_eq!(embedding.len(), 384);
}

#[tokio::test]
async fn test_embed_task_without_text_is_rejected_before_store() {
    let mut store = MockStore::new();
    store.expect_set_embedding().times(0);
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let (status, body) = post(&app, "/embed_task", json!({ "recordId": "x" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("recordId"));
}

#[tokio::test]
async fn test_embed_task_without_record_id_is_rejected() {
    let store = seeded_store(&[]).await;
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let (status, body) = post(&app, "/embed_task", json!({ "title": "Buy milk" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let store = seeded_store(&[]).await;
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/embed_task")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn test_embed_task_backend_failure_is_server_error() {
    let store = seeded_store(&[("t1", "Buy milk")]).await;
    let fake = Arc::new(FakeEmbeddingService::new(8));
    fake.fail_on("Buy milk.");
    let app = router_with(Arc::new(store.clone()), fake);

    let (status, body) = post(&app, "/embed_task", json!({ "recordId": "t1", "title": "Buy milk" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Error processing embedding: "));
    assert_eq!(store.embedding_of(&id("t1")).await, None);
}

#[tokio::test]
async fn test_search_on_empty_store() {
    let store = seeded_store(&[]).await;
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let (status, body) = post(&app, "/search_semantic", json!({ "query": "anything" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "results": [] }));
}

#[tokio::test]
async fn test_search_requires_query() {
    let store = seeded_store(&[]).await;
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let (status, body) = post(&app, "/search_semantic", json!({ "query": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = post(&app, "/search_semantic", json!({ "query": "milk", "topN": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_store_failure_is_server_error() {
    let mut store = MockStore::new();
    store
        .expect_fetch_embeddings()
        .times(1)
        .returning(|_| Err(StateStoreError::ConnectionError("connection refused".to_string())));
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let (status, body) = post(&app, "/search_semantic", json!({ "query": "milk" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Error during semantic search: "));
    assert!(!message.contains("connection refused"));
}

#[test_log::test(tokio::test)]
async fn test_embed_then_search_end_to_end() {
    let store = seeded_store(&[("milk", "Buy milk"), ("dentist", "Schedule dentist appointment")]).await;
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    for (record_id, title) in [("milk", "buy milk"), ("dentist", "schedule dentist appointment")] {
        let (status, _) = post(&app, "/embed_task", json!({ "recordId": record_id, "title": title })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = post(&app, "/search_semantic", json!({ "query": "grocery shopping" })).await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0]["recordId"], "milk");
    assert!(results[0]["score"].as_f64().unwrap() > 0.4);

    let dentist_score = results
        .iter()
        .find(|r| r["recordId"] == "dentist")
        .map(|r| r["score"].as_f64().unwrap());
    if let Some(score) = dentist_score {
        assert!(score < results[0]["score"].as_f64().unwrap());
    }
}

#[tokio::test]
async fn test_search_threshold_and_top_n_overrides() {
    let store = seeded_store(&[("a", "a"), ("b", "b"), ("c", "c")]).await;
    let ctx = RequestContext::new_root();
    store.set_embedding(&ctx, &id("a"), &[1.0, 0.0]).await.unwrap();
    store.set_embedding(&ctx, &id("b"), &[0.6, 0.8]).await.unwrap();
    store.set_embedding(&ctx, &id("c"), &[0.0, 1.0]).await.unwrap();

    let fake = Arc::new(FakeEmbeddingService::new(2));
    fake.add_embedding("q", vec![1.0, 0.0]);
    let app = router_with(Arc::new(store), fake);

    // Default threshold 0.4 drops the orthogonal record
    let (_, body) = post(&app, "/search_semantic", json!({ "query": "q" })).await;
    let ids: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["recordId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);

    let (_, body) = post(&app, "/search_semantic", json!({ "query": "q", "topN": 1 })).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let (_, body) = post(&app, "/search_semantic", json!({ "query": "q", "minScore": 0.7 })).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reembed_all_reports_totals() {
    let store = seeded_store(&[("a", "Buy milk"), ("b", "Pay rent")]).await;
    store.insert_record(TextRecord::new(id("empty"), None, None)).await;
    let app = router_with(Arc::new(store.clone()), Arc::new(MockEmbeddingService::default()));

    let (status, body) = post(&app, "/reembed_all", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 3, "embedded": 2, "skipped": 1, "failed": 0 }));
    assert!(store.embedding_of(&id("a")).await.is_some());
}

#[tokio::test]
async fn test_health_up() {
    let store = seeded_store(&[]).await;
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let (status, body) = send(&app, http::Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["dependencies"]["store"], "UP");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_down_when_store_fails() {
    let mut store = MockStore::new();
    store
        .expect_health_check()
        .returning(|| Err(StateStoreError::ConnectionError("unreachable".to_string())));
    let app = router_with(Arc::new(store), Arc::new(MockEmbeddingService::default()));

    let (status, body) = send(&app, http::Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "DOWN");
    assert_eq!(body["dependencies"]["store"], "DOWN");
}

#[tokio::test]
async fn test_startup_refuses_unhealthy_store() {
    let mut store = MockStore::new();
    store.expect_health_check().times(1).returning(|| Ok(false));
    let fake = Arc::new(FakeEmbeddingService::new(8));

    let result = AppState::verified(&ServerConfig::default(), Arc::new(store), fake.clone()).await;

    assert!(matches!(result, Err(ServerError::Store(_))));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_startup_refuses_failing_embedding_backend() {
    let store = seeded_store(&[]).await;
    let fake = Arc::new(FakeEmbeddingService::new(8));
    fake.fail_on("healthcheck");

    let result = AppState::verified(&ServerConfig::default(), Arc::new(store), fake).await;

    assert!(matches!(result, Err(ServerError::Embedding(_))));
}

#[tokio::test]
async fn test_startup_with_healthy_dependencies() {
    let store = seeded_store(&[]).await;

    let state = AppState::verified(
        &ServerConfig::default(),
        Arc::new(store),
        Arc::new(MockEmbeddingService::default()),
    )
    .await
    .unwrap();

    assert_eq!(state.model, MockEmbeddingService::default().model_name());
}
