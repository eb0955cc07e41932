//! Error handling for the Tasklens API
//!
//! Every error response is `{"message": ...}`. Client faults map to 400,
//! backend faults to 500; the underlying cause only goes to the logs.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use tasklens_kb::CoreError;

/// API Error type for returning standard error responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// Internal server error (500)
    InternalServerError(String),
}

impl ApiError {
    /// Maps a pipeline failure to a response, prefixing backend failures
    /// with what the endpoint was doing.
    pub fn from_core(operation: &str, err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => ApiError::BadRequest(message),
            CoreError::Embedding { context, .. } | CoreError::Persistence { context, .. } => {
                ApiError::InternalServerError(format!("{}: {}", operation, context))
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(message) | ApiError::InternalServerError(message) => message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "message": self.message() }));
        (status, body).into_response()
    }
}
