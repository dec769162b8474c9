//! Validation session row state
//!
//! One row per extracted key occurrence; duplicates are recorded as rows of
//! their own so the admin can see every line that matched.

use serde::{Deserialize, Serialize};

use super::extract::ParsedKeys;
use crate::domain::key_pool::AddApiKeysBatchResponse;

/// Outcome of checking a single candidate key, `Pending` until the first
/// response arrives. Failure statuses are terminal but retry-eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyValidationStatus {
    /// Not yet checked in this run
    Pending,
    /// Repeated occurrence of a key seen earlier in the input; never checked
    DuplicateInInput,
    /// Upstream accepted the key and quota remains
    Ok,
    /// Upstream accepted the key but remaining quota is zero
    OkExhausted,
    /// Upstream rejected the key (401)
    Unauthorized,
    /// Upstream refused the key (403)
    Forbidden,
    /// Upstream rejected the request for any other client-side reason (4xx)
    Invalid,
    /// Transport failure, timeout, or upstream 5xx
    Error,
}

impl KeyValidationStatus {
    /// Success statuses carry quota numbers
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::OkExhausted)
    }

    /// Failure statuses are eligible for manual retry
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Forbidden | Self::Invalid | Self::Error
        )
    }
}

/// Per-key validation state within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValidationRow {
    pub api_key: String,
    pub status: KeyValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub attempts: u32,
}

impl KeyValidationRow {
    /// New unchecked row
    pub fn pending(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            status: KeyValidationStatus::Pending,
            quota_limit: None,
            quota_remaining: None,
            detail: None,
            attempts: 0,
        }
    }

    /// Row for a repeated occurrence of an earlier key
    pub fn duplicate(api_key: impl Into<String>) -> Self {
        Self {
            status: KeyValidationStatus::DuplicateInInput,
            ..Self::pending(api_key)
        }
    }

    /// Record that a validation request was issued for this row
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Apply a successful quota response. Zero remaining quota means the key
    /// is valid but exhausted.
    pub fn apply_quota(&mut self, limit: Option<u64>, remaining: Option<u64>) {
        self.status = if remaining == Some(0) {
            KeyValidationStatus::OkExhausted
        } else {
            KeyValidationStatus::Ok
        };
        self.quota_limit = limit;
        self.quota_remaining = remaining;
        self.detail = None;
    }

    /// Apply a failure classification. Quota numbers are only valid on
    /// success and are cleared here.
    pub fn apply_failure(&mut self, status: KeyValidationStatus, detail: impl Into<String>) {
        debug_assert!(status.is_failure());
        self.status = status;
        self.quota_limit = None;
        self.quota_remaining = None;
        self.detail = Some(detail.into());
    }
}

/// Session-scoped state of one open validation dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysValidationState {
    /// Target import group
    pub group: String,
    /// Total pasted lines, including blank ones
    pub input_lines: usize,
    /// Lines that yielded a key match
    pub valid_lines: usize,
    /// Distinct keys among the matches
    pub unique_in_input: usize,
    /// Repeated occurrences (`valid_lines - unique_in_input`)
    pub duplicate_in_input: usize,
    /// True while any validation request of the current run is outstanding
    pub checking: bool,
    /// True while the batch import call is outstanding
    pub importing: bool,
    /// One row per matched line, first-seen order
    pub rows: Vec<KeyValidationRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_report: Option<AddApiKeysBatchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_error: Option<String>,
}

impl KeysValidationState {
    /// Build the initial row set from parsed input. The parse counts are
    /// frozen for the lifetime of the session.
    pub fn from_parsed(group: impl Into<String>, parsed: ParsedKeys) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut rows = Vec::with_capacity(parsed.keys.len());

        for key in &parsed.keys {
            if seen.insert(key.clone()) {
                rows.push(KeyValidationRow::pending(key));
            } else {
                rows.push(KeyValidationRow::duplicate(key));
            }
        }

        let unique_in_input = seen.len();

        Self {
            group: group.into(),
            input_lines: parsed.input_lines,
            valid_lines: parsed.valid_lines,
            unique_in_input,
            duplicate_in_input: parsed.valid_lines - unique_in_input,
            checking: false,
            importing: false,
            rows,
            import_report: None,
            import_warning: None,
            import_error: None,
        }
    }

    /// The canonical row for a key: the first occurrence (duplicate rows for
    /// the same key come later in input order).
    pub fn row_mut(&mut self, api_key: &str) -> Option<&mut KeyValidationRow> {
        self.rows.iter_mut().find(|row| row.api_key == api_key)
    }

    /// Keys currently pending a first check
    pub fn pending_keys(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.status == KeyValidationStatus::Pending)
            .map(|row| row.api_key.clone())
            .collect()
    }

    /// Keys currently in a failure status
    pub fn failed_keys(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.status.is_failure())
            .map(|row| row.api_key.clone())
            .collect()
    }

    /// True while either checking or importing is outstanding; the two are
    /// never simultaneously true.
    pub fn is_busy(&self) -> bool {
        self.checking || self.importing
    }
}
