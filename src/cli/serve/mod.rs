//! Serve command - runs the admin API server

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::state::AppState;
use crate::api::{admin, health};
use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Run the API server
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let state = crate::create_app_state(&config)?;
    let app = create_router(state);

    let addr = build_socket_addr(&config)?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .route("/ready", get(health::ready_check))
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::infrastructure::key_pool::{InMemoryKeyPoolRepository, KeyPoolService};
    use crate::infrastructure::quota::HttpQuotaChecker;
    use crate::infrastructure::validation::ValidationSessionManager;

    async fn test_router() -> (Router, Arc<ValidationSessionManager>, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "limit": 1000,
                "remaining": 500,
            })))
            .mount(&server)
            .await;

        let repository = Arc::new(InMemoryKeyPoolRepository::new());
        let key_pool = Arc::new(KeyPoolService::new(repository));
        let sessions = Arc::new(ValidationSessionManager::new(
            Arc::new(HttpQuotaChecker::with_base_url(server.uri())),
            Arc::clone(&key_pool) as Arc<dyn crate::domain::key_pool::KeyImporter>,
            4,
        ));

        let router = create_router(AppState {
            sessions: Arc::clone(&sessions),
            key_pool,
        });
        (router, sessions, server)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (router, _, _server) = test_router().await;

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_validation_endpoints() {
        let (router, sessions, _server) = test_router().await;

        let request = Request::post("/admin/keys/validation")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "group": "default",
                    "text": "tvly-dev-a\ntvly-dev-a\nnoise\n",
                })
                .to_string(),
            ))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["input_lines"], 3);
        assert_eq!(body["valid_lines"], 2);
        assert_eq!(body["unique_in_input"], 1);
        assert_eq!(body["counts"]["total_to_check"], 1);

        sessions.wait_until_idle().await;

        let response = router
            .clone()
            .oneshot(
                Request::get("/admin/keys/validation")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["rows"][0]["status"], "ok");
        assert_eq!(body["valid_keys"], serde_json::json!(["tvly-dev-a"]));

        let response = router
            .clone()
            .oneshot(
                Request::post("/admin/keys/validation/import")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["import_report"]["summary"]["created"], 1);

        let response = router
            .clone()
            .oneshot(Request::get("/admin/keys").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["keys"][0]["api_key"], "tvly-dev-a");
        assert_eq!(body["keys"][0]["status"], "active");
        assert_eq!(body["keys"][0]["quota_remaining"], 500);

        let response = router
            .clone()
            .oneshot(
                Request::delete("/admin/keys/validation")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(
                Request::get("/admin/keys/validation")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_pool_key_endpoint() {
        let (router, sessions, _server) = test_router().await;

        sessions.start("default", "tvly-dev-a\n").await.unwrap();
        sessions.wait_until_idle().await;
        sessions.import_valid().await.unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::delete("/admin/keys/tvly-dev-a")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "deleted");

        let response = router
            .oneshot(
                Request::delete("/admin/keys/tvly-dev-missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
