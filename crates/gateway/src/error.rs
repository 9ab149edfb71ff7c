//! Boundary error type for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cartmanify_core::error::TransformError;
use cartmanify_core::wire::ErrorBody;
use tracing::{error, warn};

/// An error rendered as `{ "error": message }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransformError> for ApiError {
    fn from(err: TransformError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &err {
            TransformError::Validation(v) => warn!(error = %v, "Rejected transform request"),
            TransformError::Upstream { detail } => {
                error!(status = status.as_u16(), detail = %detail, "Transform failed")
            }
            other => error!(status = status.as_u16(), error = %other, "Transform failed"),
        }

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
