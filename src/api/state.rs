//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::key_pool::{InMemoryKeyPoolRepository, KeyPoolService};
use crate::infrastructure::validation::ValidationSessionManager;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ValidationSessionManager>,
    pub key_pool: Arc<KeyPoolService<InMemoryKeyPoolRepository>>,
}
