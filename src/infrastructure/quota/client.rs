//! HTTP quota checker
//!
//! Calls the upstream usage endpoint once per candidate key and maps the
//! response onto the domain classification.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::domain::validation::{KeyQuota, QuotaChecker, QuotaFailure};
use crate::domain::DomainError;

const API_KEY_HEADER: &str = "Api-Key";

/// Quota checker backed by `GET {base_url}/usage`
#[derive(Debug)]
pub struct HttpQuotaChecker {
    client: reqwest::Client,
    base_url: String,
}

/// Upstream usage payload. Fields the upstream omits stay `None` rather than
/// failing the parse.
#[derive(Debug, Deserialize)]
struct UsageResponse {
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    remaining: Option<u64>,
}

impl HttpQuotaChecker {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("failed to build http client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn usage_url(&self) -> String {
        format!("{}/usage", self.base_url)
    }
}

#[async_trait]
impl QuotaChecker for HttpQuotaChecker {
    async fn check_key(&self, api_key: &str) -> Result<KeyQuota, QuotaFailure> {
        let response = self
            .client
            .get(self.usage_url())
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| QuotaFailure::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "usage request rejected");
            return Err(QuotaFailure::from_status(status.as_u16()));
        }

        let usage: UsageResponse =
            response.json().await.map_err(|e| QuotaFailure::Transport {
                message: e.to_string(),
            })?;

        Ok(KeyQuota::new(usage.limit, usage.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn checker(server: &MockServer) -> HttpQuotaChecker {
        HttpQuotaChecker::with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_success_returns_quota() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .and(header("Api-Key", "tvly-dev-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "limit": 1000,
                "remaining": 750,
            })))
            .mount(&server)
            .await;

        let quota = checker(&server).await.check_key("tvly-dev-a").await.unwrap();

        assert_eq!(quota.limit, Some(1000));
        assert_eq!(quota.remaining, Some(750));
    }

    #[tokio::test]
    async fn test_missing_quota_fields_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let quota = checker(&server).await.check_key("tvly-dev-a").await.unwrap();

        assert_eq!(quota.limit, None);
        assert_eq!(quota.remaining, None);
    }

    #[tokio::test]
    async fn test_unauthorized_and_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .and(header("Api-Key", "tvly-dev-revoked"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .and(header("Api-Key", "tvly-dev-blocked"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let checker = checker(&server).await;
        assert_eq!(
            checker.check_key("tvly-dev-revoked").await.unwrap_err(),
            QuotaFailure::Unauthorized
        );
        assert_eq!(
            checker.check_key("tvly-dev-blocked").await.unwrap_err(),
            QuotaFailure::Forbidden
        );
    }

    #[tokio::test]
    async fn test_other_client_error_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let err = checker(&server).await.check_key("tvly-dev-a").await.unwrap_err();

        assert_eq!(err, QuotaFailure::Rejected { status: 422 });
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = checker(&server).await.check_key("tvly-dev-a").await.unwrap_err();

        assert_eq!(err, QuotaFailure::Upstream { status: 503 });
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport() {
        let checker = HttpQuotaChecker::with_base_url("http://127.0.0.1:1");

        let err = checker.check_key("tvly-dev-a").await.unwrap_err();

        assert!(matches!(err, QuotaFailure::Transport { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = checker(&server).await.check_key("tvly-dev-a").await.unwrap_err();

        assert!(matches!(err, QuotaFailure::Transport { .. }));
    }
}
