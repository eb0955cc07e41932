//! Embedding and search handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use tasklens_kb::{EmbedTaskRequest, ReembedReport, RequestContext, SearchRequest, SearchResponse};

use super::errors::ApiError;
use crate::server::AppState;

/// Success body of `POST /embed_task`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTaskResponse {
    pub message: String,
    pub record_id: String,
}

/// `POST /embed_task`
pub async fn embed_task(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EmbedTaskRequest>, JsonRejection>,
) -> Result<Json<EmbedTaskResponse>, ApiError> {
    let Json(request) = body?;
    let ctx = RequestContext::new_root();

    let outcome = state
        .ingestion
        .ingest(&request, &ctx)
        .await
        .map_err(|e| ApiError::from_core("Error processing embedding", e))?;

    Ok(Json(EmbedTaskResponse {
        message: "Embedding stored successfully".to_string(),
        record_id: outcome.record_id.into_inner(),
    }))
}

/// `POST /search_semantic`
pub async fn search_semantic(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = body?;
    let ctx = RequestContext::new_root();

    let results = state
        .query
        .search(&request, &ctx)
        .await
        .map_err(|e| ApiError::from_core("Error during semantic search", e))?;

    Ok(Json(SearchResponse { results }))
}

/// `POST /reembed_all`
pub async fn reembed_all(State(state): State<Arc<AppState>>) -> Result<Json<ReembedReport>, ApiError> {
    let ctx = RequestContext::new_root();

    let report = state
        .ingestion
        .reembed_all(&ctx)
        .await
        .map_err(|e| ApiError::from_core("Error re-embedding records", e))?;

    Ok(Json(report))
}
