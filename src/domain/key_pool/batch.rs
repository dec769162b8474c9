//! Batch import contract
//!
//! Every submitted key appears exactly once in `results`, and the four
//! per-key outcomes are mutually exclusive.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Outcome of importing one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyImportStatus {
    /// Key was new to the pool
    Created,
    /// Key existed as soft-deleted and was reactivated
    Undeleted,
    /// Key was already present and not deleted
    Existed,
    /// Key could not be imported
    Failed,
}

/// Per-key entry of the import report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyImportResult {
    pub api_key: String,
    pub status: KeyImportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counts of the import report. The first four fields describe the
/// submitted key list the way the parse step describes pasted text; since the
/// submitted set is already deduplicated, `duplicate_in_input` is zero there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub input_lines: usize,
    pub valid_lines: usize,
    pub unique_in_input: usize,
    pub duplicate_in_input: usize,
    pub created: usize,
    pub undeleted: usize,
    pub existed: usize,
    pub failed: usize,
}

/// One key submitted for import, together with the quota observed when it
/// was validated. The pool records the snapshot so an imported key with zero
/// remaining quota starts out exhausted rather than active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyImportCandidate {
    pub api_key: String,
    pub quota_limit: Option<u64>,
    pub quota_remaining: Option<u64>,
}

impl KeyImportCandidate {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            quota_limit: None,
            quota_remaining: None,
        }
    }

    pub fn with_quota(mut self, limit: Option<u64>, remaining: Option<u64>) -> Self {
        self.quota_limit = limit;
        self.quota_remaining = remaining;
        self
    }
}

/// Structured report of one batch import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddApiKeysBatchResponse {
    pub summary: BatchSummary,
    pub results: Vec<KeyImportResult>,
}

impl AddApiKeysBatchResponse {
    /// Entries that did not make it into the pool
    pub fn failed_results(&self) -> impl Iterator<Item = &KeyImportResult> {
        self.results
            .iter()
            .filter(|result| result.status == KeyImportStatus::Failed)
    }
}

/// Batch import seam used by the validation session
#[async_trait]
pub trait KeyImporter: Send + Sync + Debug {
    /// Import the deduplicated candidate set into `group`. A `Err` return
    /// means no structured report was obtained and nothing is assumed about
    /// individual keys.
    async fn import_batch(
        &self,
        group: &str,
        candidates: &[KeyImportCandidate],
    ) -> Result<AddApiKeysBatchResponse, DomainError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&KeyImportStatus::Undeleted).unwrap(),
            "\"undeleted\""
        );
    }

    #[test]
    fn test_failed_results_filter() {
        let response = AddApiKeysBatchResponse {
            summary: BatchSummary {
                input_lines: 2,
                valid_lines: 2,
                unique_in_input: 2,
                duplicate_in_input: 0,
                created: 1,
                undeleted: 0,
                existed: 0,
                failed: 1,
            },
            results: vec![
                KeyImportResult {
                    api_key: "tvly-dev-a".into(),
                    status: KeyImportStatus::Created,
                    error: None,
                },
                KeyImportResult {
                    api_key: "tvly-dev-b".into(),
                    status: KeyImportStatus::Failed,
                    error: Some("storage unavailable".into()),
                },
            ],
        };

        let failed: Vec<_> = response.failed_results().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].api_key, "tvly-dev-b");
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let response = AddApiKeysBatchResponse {
            summary: BatchSummary {
                input_lines: 1,
                valid_lines: 1,
                unique_in_input: 1,
                duplicate_in_input: 0,
                created: 1,
                undeleted: 0,
                existed: 0,
                failed: 0,
            },
            results: vec![KeyImportResult {
                api_key: "tvly-dev-a".into(),
                status: KeyImportStatus::Created,
                error: None,
            }],
        };

        let json = serde_json::to_string(&response).unwrap();
        let parsed: AddApiKeysBatchResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }
}
