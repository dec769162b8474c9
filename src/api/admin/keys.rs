//! Key pool admin endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::key_pool::{PoolKey, PoolKeyStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListKeysQuery {
    pub status: Option<PoolKeyStatus>,
}

/// Pool key response for the admin API
#[derive(Debug, Clone, Serialize)]
pub struct PoolKeyResponse {
    pub api_key: String,
    pub group: String,
    pub status: PoolKeyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_remaining: Option<u64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&PoolKey> for PoolKeyResponse {
    fn from(key: &PoolKey) -> Self {
        Self {
            api_key: key.api_key().to_string(),
            group: key.group().to_string(),
            status: key.status(),
            quota_limit: key.quota_limit(),
            quota_remaining: key.quota_remaining(),
            created_at: key.created_at().to_rfc3339(),
            updated_at: key.updated_at().to_rfc3339(),
        }
    }
}

/// List pool keys response
#[derive(Debug, Clone, Serialize)]
pub struct ListKeysResponse {
    pub keys: Vec<PoolKeyResponse>,
    pub total: usize,
}

/// GET /admin/keys
pub async fn list_keys(
    State(state): State<AppState>,
    Query(query): Query<ListKeysQuery>,
) -> Result<Json<ListKeysResponse>, ApiError> {
    debug!("Admin listing pool keys");

    let keys = state
        .key_pool
        .list_keys(query.status)
        .await
        .map_err(ApiError::from)?;

    let key_responses: Vec<PoolKeyResponse> = keys.iter().map(PoolKeyResponse::from).collect();
    let total = key_responses.len();

    Ok(Json(ListKeysResponse {
        keys: key_responses,
        total,
    }))
}

/// DELETE /admin/keys/:api_key
pub async fn delete_key(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
) -> Result<Json<PoolKeyResponse>, ApiError> {
    debug!(api_key = %api_key, "Admin deleting pool key");

    let key = state
        .key_pool
        .delete_key(&api_key)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PoolKeyResponse::from(&key)))
}
