//! Shared API types
//!
//! Error responses are rendered as `{"error", "code", "message"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::QueryError;
use crate::domain::query::FilterGenerationError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    Internal { code: String, message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidData(e) => {
                Self::bad_request("INVALID_DATA", format!("Invalid data format: {}", e))
            }
            QueryError::Generation(e @ FilterGenerationError::Exhausted { .. }) => {
                tracing::error!(error = %e, "Filter generation exhausted");
                Self::internal("AI_FILTER_EXHAUSTED", e.to_string())
            }
            QueryError::Generation(e @ FilterGenerationError::Backend(_)) => {
                tracing::error!(error = %e, "AI service error");
                Self::internal("AI_SERVICE_ERROR", e.to_string())
            }
            e @ QueryError::Evaluation(_) => {
                tracing::error!(error = %e, "Filter evaluation failed");
                Self::internal("FILTER_APPLY_FAILED", e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::Internal { code, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                code,
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
