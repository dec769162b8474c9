//! In-memory key pool repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::key_pool::{KeyPoolRepository, PoolKey, PoolKeyStatus};
use crate::domain::DomainError;

/// In-memory repository. Insertion order is tracked separately so listings
/// are stable.
#[derive(Debug, Default)]
pub struct InMemoryKeyPoolRepository {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    keys: HashMap<String, PoolKey>,
    order: Vec<String>,
}

impl InMemoryKeyPoolRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyPoolRepository for InMemoryKeyPoolRepository {
    async fn get(&self, api_key: &str) -> Result<Option<PoolKey>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.keys.get(api_key).cloned())
    }

    async fn insert(&self, key: PoolKey) -> Result<PoolKey, DomainError> {
        let mut inner = self.inner.write().await;
        if inner.keys.contains_key(key.api_key()) {
            return Err(DomainError::conflict(format!(
                "key '{}' already exists in the pool",
                key.api_key()
            )));
        }
        inner.order.push(key.api_key().to_owned());
        inner.keys.insert(key.api_key().to_owned(), key.clone());
        Ok(key)
    }

    async fn update(&self, key: &PoolKey) -> Result<PoolKey, DomainError> {
        let mut inner = self.inner.write().await;
        if !inner.keys.contains_key(key.api_key()) {
            return Err(DomainError::not_found(format!(
                "key '{}' not found in the pool",
                key.api_key()
            )));
        }
        inner.keys.insert(key.api_key().to_owned(), key.clone());
        Ok(key.clone())
    }

    async fn list(&self, status: Option<PoolKeyStatus>) -> Result<Vec<PoolKey>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|api_key| inner.keys.get(api_key))
            .filter(|key| status.is_none_or(|s| key.status() == s))
            .cloned()
            .collect())
    }

    async fn count(&self, status: Option<PoolKeyStatus>) -> Result<usize, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .keys
            .values()
            .filter(|key| status.is_none_or(|s| key.status() == s))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryKeyPoolRepository::new();
        repo.insert(PoolKey::new("tvly-dev-a", "default"))
            .await
            .unwrap();

        let key = repo.get("tvly-dev-a").await.unwrap().unwrap();
        assert_eq!(key.group(), "default");
        assert!(repo.get("tvly-dev-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_conflict() {
        let repo = InMemoryKeyPoolRepository::new();
        repo.insert(PoolKey::new("tvly-dev-a", "default"))
            .await
            .unwrap();

        let err = repo
            .insert(PoolKey::new("tvly-dev-a", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_key() {
        let repo = InMemoryKeyPoolRepository::new();
        let key = PoolKey::new("tvly-dev-a", "default");

        let err = repo.update(&key).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order_and_filters() {
        let repo = InMemoryKeyPoolRepository::new();
        repo.insert(PoolKey::new("tvly-dev-b", "default"))
            .await
            .unwrap();
        repo.insert(PoolKey::new("tvly-dev-a", "default"))
            .await
            .unwrap();

        let mut deleted = repo.get("tvly-dev-b").await.unwrap().unwrap();
        deleted.mark_deleted();
        repo.update(&deleted).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].api_key(), "tvly-dev-b");

        let active = repo.list(Some(PoolKeyStatus::Active)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].api_key(), "tvly-dev-a");

        assert_eq!(repo.count(None).await.unwrap(), 2);
        assert_eq!(repo.count(Some(PoolKeyStatus::Deleted)).await.unwrap(), 1);
    }
}
