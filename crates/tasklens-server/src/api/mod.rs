//! API module for the Tasklens Server

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod health;
pub mod tasks;

use crate::server::AppState;

/// Build the router for API endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Embedding and retrieval
        .route("/embed_task", post(tasks::embed_task))
        .route("/search_semantic", post(tasks::search_semantic))
        // Maintenance
        .route("/reembed_all", post(tasks::reembed_all))
        // Health check
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        // Shared state
        .with_state(state)
}
