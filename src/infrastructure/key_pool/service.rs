//! Key pool service

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::key_pool::{
    AddApiKeysBatchResponse, BatchSummary, KeyImportCandidate, KeyImportResult, KeyImportStatus,
    KeyImporter, KeyPoolRepository, PoolKey, PoolKeyStatus,
};
use crate::domain::validation::extract_key_from_line;
use crate::domain::DomainError;

/// Service over the key pool. Owns import semantics: new keys are created,
/// soft-deleted keys are brought back, present keys keep their row but get a
/// fresh quota observation.
#[derive(Debug)]
pub struct KeyPoolService<R: KeyPoolRepository> {
    repository: Arc<R>,
}

impl<R: KeyPoolRepository> KeyPoolService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// List pool keys, optionally filtered by status
    pub async fn list_keys(
        &self,
        status: Option<PoolKeyStatus>,
    ) -> Result<Vec<PoolKey>, DomainError> {
        self.repository.list(status).await
    }

    /// Soft-delete a pool key
    pub async fn delete_key(&self, api_key: &str) -> Result<PoolKey, DomainError> {
        let mut key = self
            .repository
            .get(api_key)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("key '{api_key}' not found")))?;

        if key.is_deleted() {
            return Err(DomainError::conflict(format!(
                "key '{api_key}' is already deleted"
            )));
        }

        key.mark_deleted();
        let key = self.repository.update(&key).await?;

        info!(api_key = %key.api_key(), "pool key deleted");

        Ok(key)
    }

    pub async fn count_keys(&self, status: Option<PoolKeyStatus>) -> Result<usize, DomainError> {
        self.repository.count(status).await
    }

    async fn import_one(&self, group: &str, candidate: &KeyImportCandidate) -> KeyImportResult {
        match self.import_one_inner(group, candidate).await {
            Ok(status) => KeyImportResult {
                api_key: candidate.api_key.clone(),
                status,
                error: None,
            },
            Err(err) => {
                warn!(api_key = %candidate.api_key, error = %err, "key import failed");
                KeyImportResult {
                    api_key: candidate.api_key.clone(),
                    status: KeyImportStatus::Failed,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Import one candidate, recording its quota snapshot on every outcome.
    /// A candidate whose remaining quota was observed as zero enters (or
    /// re-enters) the pool as exhausted.
    async fn import_one_inner(
        &self,
        group: &str,
        candidate: &KeyImportCandidate,
    ) -> Result<KeyImportStatus, DomainError> {
        let api_key = candidate.api_key.as_str();
        if extract_key_from_line(api_key) != Some(api_key) {
            return Err(DomainError::validation(format!(
                "'{api_key}' is not a well-formed api key"
            )));
        }

        match self.repository.get(api_key).await? {
            None => {
                let key = PoolKey::new(api_key, group)
                    .with_quota(candidate.quota_limit, candidate.quota_remaining);
                self.repository.insert(key).await?;
                Ok(KeyImportStatus::Created)
            }
            Some(mut key) if key.is_deleted() => {
                key.set_quota(candidate.quota_limit, candidate.quota_remaining);
                key.undelete(group);
                self.repository.update(&key).await?;
                Ok(KeyImportStatus::Undeleted)
            }
            Some(mut key) => {
                key.set_quota(candidate.quota_limit, candidate.quota_remaining);
                self.repository.update(&key).await?;
                Ok(KeyImportStatus::Existed)
            }
        }
    }
}

#[async_trait]
impl<R: KeyPoolRepository> KeyImporter for KeyPoolService<R> {
    async fn import_batch(
        &self,
        group: &str,
        candidates: &[KeyImportCandidate],
    ) -> Result<AddApiKeysBatchResponse, DomainError> {
        let mut results = Vec::with_capacity(candidates.len());
        let mut seen = std::collections::HashSet::new();

        for candidate in candidates {
            if !seen.insert(candidate.api_key.as_str()) {
                continue;
            }
            results.push(self.import_one(group, candidate).await);
        }

        let count_of = |status: KeyImportStatus| {
            results
                .iter()
                .filter(|result| result.status == status)
                .count()
        };

        let summary = BatchSummary {
            input_lines: candidates.len(),
            valid_lines: candidates.len(),
            unique_in_input: seen.len(),
            duplicate_in_input: candidates.len() - seen.len(),
            created: count_of(KeyImportStatus::Created),
            undeleted: count_of(KeyImportStatus::Undeleted),
            existed: count_of(KeyImportStatus::Existed),
            failed: count_of(KeyImportStatus::Failed),
        };

        info!(
            group = %group,
            created = summary.created,
            undeleted = summary.undeleted,
            existed = summary.existed,
            failed = summary.failed,
            "key batch imported"
        );

        Ok(AddApiKeysBatchResponse { summary, results })
    }
}
