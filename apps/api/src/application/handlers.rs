//! Axum route handlers for the application form.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::application::validation::validate_application;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
}

/// POST /api/submit
///
/// Validates the submission and relays it to the configured chat.
/// Invalid submissions never reach the relay.
pub async fn handle_submit(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission_id = Uuid::new_v4();
    process_submission(state, payload)
        .instrument(info_span!("submission", %submission_id))
        .await
}

async fn process_submission(
    state: AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(raw) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let body = raw
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Request body must be a JSON object".to_string()))?;

    let record = validate_application(body).map_err(|errors| {
        info!(fields = ?errors.fields(), "Submission rejected by validation");
        AppError::Validation(errors)
    })?;

    match AppError::from_outcome(state.relay.submit(&record).await) {
        None => Ok(Json(SubmitResponse { ok: true })),
        Some(err) => Err(err),
    }
}

/// Any method other than POST on the submit route.
pub async fn handle_method_not_allowed() -> Result<(), AppError> {
    Err(AppError::MethodNotAllowed)
}
