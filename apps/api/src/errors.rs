use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::application::validation::ValidationErrors;
use crate::relay::RelayOutcome;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every response body carries `"ok": false` plus exactly one of `errors`
/// (field map) or `error` (message).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {} field(s) invalid", .0.len())]
    Validation(ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Relay error (status {status}): {reason}")]
    Relay { reason: String, status: u16 },

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    /// `None` for a successful outcome.
    pub fn from_outcome(outcome: RelayOutcome) -> Option<Self> {
        match outcome {
            RelayOutcome::Success => None,
            RelayOutcome::Failure {
                reason,
                http_status_hint,
            } => Some(AppError::Relay {
                reason,
                status: http_status_hint,
            }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "errors": errors }),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "ok": false, "error": msg }))
            }
            AppError::Relay { reason, status } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                if status.is_server_error() {
                    tracing::error!("Relay failed with {status}: {reason}");
                }
                (status, json!({ "ok": false, "error": reason }))
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "ok": false, "error": "method not allowed" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
