//! Validation session admin endpoints
//!
//! The session snapshot returned by every endpoint carries the row list plus
//! the derived counts and key lists, so clients never recompute them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::key_pool::AddApiKeysBatchResponse;
use crate::domain::validation::{
    compute_exhausted_keys, compute_valid_keys, compute_validation_counts, KeyValidationRow,
    KeysValidationState, ValidationCounts,
};

fn default_group() -> String {
    "default".to_string()
}

/// Request to open a validation session from pasted text
#[derive(Debug, Clone, Deserialize)]
pub struct StartValidationRequest {
    #[serde(default = "default_group")]
    pub group: String,
    pub text: String,
}

/// Snapshot of the session, enriched with derived state
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSnapshotResponse {
    pub group: String,
    pub input_lines: usize,
    pub valid_lines: usize,
    pub unique_in_input: usize,
    pub duplicate_in_input: usize,
    pub checking: bool,
    pub importing: bool,
    pub rows: Vec<KeyValidationRow>,
    pub counts: ValidationCounts,
    pub valid_keys: Vec<String>,
    pub exhausted_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_report: Option<AddApiKeysBatchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_error: Option<String>,
}

impl From<KeysValidationState> for ValidationSnapshotResponse {
    fn from(state: KeysValidationState) -> Self {
        let counts = compute_validation_counts(&state);
        let valid_keys = compute_valid_keys(&state);
        let exhausted_keys = compute_exhausted_keys(&state);

        Self {
            group: state.group,
            input_lines: state.input_lines,
            valid_lines: state.valid_lines,
            unique_in_input: state.unique_in_input,
            duplicate_in_input: state.duplicate_in_input,
            checking: state.checking,
            importing: state.importing,
            rows: state.rows,
            counts,
            valid_keys,
            exhausted_keys,
            import_report: state.import_report,
            import_warning: state.import_warning,
            import_error: state.import_error,
        }
    }
}

/// POST /admin/keys/validation
pub async fn start_validation(
    State(state): State<AppState>,
    Json(request): Json<StartValidationRequest>,
) -> Result<Json<ValidationSnapshotResponse>, ApiError> {
    debug!(group = %request.group, "Admin starting key validation");

    let snapshot = state
        .sessions
        .start(request.group, &request.text)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(snapshot.into()))
}

/// GET /admin/keys/validation
pub async fn get_validation(
    State(state): State<AppState>,
) -> Result<Json<ValidationSnapshotResponse>, ApiError> {
    let snapshot = state
        .sessions
        .snapshot()
        .await
        .ok_or_else(|| ApiError::not_found("no open validation session"))?;

    Ok(Json(snapshot.into()))
}

/// DELETE /admin/keys/validation
pub async fn close_validation(State(state): State<AppState>) -> StatusCode {
    state.sessions.close().await;
    StatusCode::NO_CONTENT
}

/// POST /admin/keys/validation/retry
pub async fn retry_failed(
    State(state): State<AppState>,
) -> Result<Json<ValidationSnapshotResponse>, ApiError> {
    debug!("Admin retrying failed keys");

    let snapshot = state.sessions.retry_failed().await.map_err(ApiError::from)?;

    Ok(Json(snapshot.into()))
}

/// POST /admin/keys/validation/retry/:api_key
pub async fn retry_one(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
) -> Result<Json<ValidationSnapshotResponse>, ApiError> {
    debug!(api_key = %api_key, "Admin retrying one key");

    let snapshot = state
        .sessions
        .retry_one(&api_key)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(snapshot.into()))
}

/// POST /admin/keys/validation/import
pub async fn import_valid(
    State(state): State<AppState>,
) -> Result<Json<ValidationSnapshotResponse>, ApiError> {
    debug!("Admin importing validated keys");

    let snapshot = state.sessions.import_valid().await.map_err(ApiError::from)?;

    Ok(Json(snapshot.into()))
}
