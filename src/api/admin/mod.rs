//! Admin API endpoints for managing the key pool

pub mod key_validation;
pub mod keys;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // Validation session
        .route("/keys/validation", post(key_validation::start_validation))
        .route("/keys/validation", get(key_validation::get_validation))
        .route(
            "/keys/validation",
            delete(key_validation::close_validation),
        )
        .route("/keys/validation/retry", post(key_validation::retry_failed))
        .route(
            "/keys/validation/retry/{api_key}",
            post(key_validation::retry_one),
        )
        .route("/keys/validation/import", post(key_validation::import_valid))
        // Key pool
        .route("/keys", get(keys::list_keys))
        .route("/keys/{api_key}", delete(keys::delete_key))
}
