//! Error types for the template API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use template_engine::{EngineError, PersistenceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::PermissionDenied => ApiError::PermissionDenied,
            PersistenceError::NotFound(what) => ApiError::TemplateNotFound(what),
            PersistenceError::Transient(msg) => ApiError::Unavailable(msg),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => ApiError::InvalidRequest(msg),
            EngineError::NotFound(id) => {
                ApiError::InvalidRequest(format!("Variable not found: {}", id))
            }
            EngineError::Persistence(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::TemplateNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Template not found: {}", id))
            }
            ApiError::PermissionDenied => (StatusCode::FORBIDDEN, "Permission denied".to_string()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unavailable(msg) => {
                tracing::warn!("Storage unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage unavailable".to_string(),
                )
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::VariableId;

    #[test]
    fn test_engine_errors_map_to_statuses() {
        let cases = [
            (
                ApiError::from(EngineError::Validation("bad".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(EngineError::NotFound(VariableId::new("v1"))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(EngineError::Persistence(PersistenceError::PermissionDenied)),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(PersistenceError::NotFound("t1".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(PersistenceError::Transient("locked".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
