//! Health check endpoint for the Tasklens Server

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::server::AppState;

/// Health check handler
///
/// Reports `UP` with 200 when the record store answers, `DOWN` with 503
/// otherwise.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Health check requested");

    let store_status = match state.store.health_check().await {
        Ok(true) => "UP",
        Ok(false) => "DOWN",
        Err(e) => {
            warn!(error = %e, "Record store health check failed");
            "DOWN"
        }
    };

    let (status_code, overall) = if store_status == "UP" {
        (StatusCode::OK, "UP")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
    };

    let response = json!({
        "status": overall,
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model,
        "dependencies": {
            "store": store_status,
        },
    });

    (status_code, Json(response))
}
