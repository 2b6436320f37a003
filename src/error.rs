//! Error types shared by collaborators and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure of an external collaborator (classifier, sentiment, NER, OCR).
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("no usable signal in input")]
    NoSignal,
    #[error("missing api token")]
    MissingToken,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("{tool} exited with {status}")]
    Tool { tool: &'static str, status: String },
}

/// Errors surfaced to HTTP clients as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("incident {0} not found")]
    NotFound(u64),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
