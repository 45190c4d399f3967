//! HTTP-facing errors.

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::workload::WorkloadError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Path parameter could not be coerced to the handler's type.
    #[error("{0}")]
    InvalidPath(#[from] PathRejection),

    #[error("{0}")]
    Workload(#[from] WorkloadError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidPath(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Workload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
