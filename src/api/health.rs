//! Health check endpoints for liveness and readiness probes

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

/// GET /ready
pub async fn ready_check() -> StatusCode {
    StatusCode::OK
}
