//! Key pool repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{PoolKey, PoolKeyStatus};
use crate::domain::DomainError;

/// Storage for pool keys, keyed by the full key string
#[async_trait]
pub trait KeyPoolRepository: Send + Sync + Debug {
    /// Get a key by its key string, deleted keys included
    async fn get(&self, api_key: &str) -> Result<Option<PoolKey>, DomainError>;

    /// Insert a new key; conflict if the key string is already present
    async fn insert(&self, key: PoolKey) -> Result<PoolKey, DomainError>;

    /// Update an existing key
    async fn update(&self, key: &PoolKey) -> Result<PoolKey, DomainError>;

    /// List keys in insertion order (optionally filtered by status)
    async fn list(&self, status: Option<PoolKeyStatus>) -> Result<Vec<PoolKey>, DomainError>;

    /// Count keys (optionally filtered by status)
    async fn count(&self, status: Option<PoolKeyStatus>) -> Result<usize, DomainError>;
}
