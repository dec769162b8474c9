//! Key pool gateway
//!
//! Batch validation and import of upstream API keys:
//! - Paste text, extract candidate keys, deduplicate
//! - Check each key's quota against the upstream usage endpoint
//! - Retry failed checks, then import the validated keys into the pool

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::DomainError;
use infrastructure::key_pool::{InMemoryKeyPoolRepository, KeyPoolService};
use infrastructure::quota::HttpQuotaChecker;
use infrastructure::validation::ValidationSessionManager;

/// Create the application state with all services initialized
pub fn create_app_state(config: &AppConfig) -> Result<AppState, DomainError> {
    let repository = Arc::new(InMemoryKeyPoolRepository::new());
    let key_pool = Arc::new(KeyPoolService::new(repository));
    let quota = Arc::new(HttpQuotaChecker::new(&config.upstream)?);

    let sessions = Arc::new(ValidationSessionManager::new(
        quota,
        Arc::clone(&key_pool) as Arc<dyn domain::key_pool::KeyImporter>,
        config.validation.concurrency,
    ));

    Ok(AppState { sessions, key_pool })
}
