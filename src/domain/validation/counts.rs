//! Derived session state
//!
//! Pure recomputation over the row snapshot on every read; nothing here is
//! incrementally maintained, so the counts cannot drift from the rows.

use std::collections::HashSet;

use serde::Serialize;

use super::row::{KeyValidationStatus, KeysValidationState};

/// Counts by status over one snapshot. The three client-side rejection
/// statuses fold into `invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationCounts {
    pub pending: usize,
    pub duplicate: usize,
    pub ok: usize,
    pub exhausted: usize,
    pub invalid: usize,
    pub error: usize,
    /// Rows that have settled: `ok + exhausted + invalid + error`
    pub checked: usize,
    /// Unique keys in the input, the denominator for progress display
    pub total_to_check: usize,
}

/// Single pass over the rows; `pending + duplicate + ok + exhausted +
/// invalid + error == rows.len()`.
pub fn compute_validation_counts(state: &KeysValidationState) -> ValidationCounts {
    let mut pending = 0;
    let mut duplicate = 0;
    let mut ok = 0;
    let mut exhausted = 0;
    let mut invalid = 0;
    let mut error = 0;

    for row in &state.rows {
        match row.status {
            KeyValidationStatus::Pending => pending += 1,
            KeyValidationStatus::DuplicateInInput => duplicate += 1,
            KeyValidationStatus::Ok => ok += 1,
            KeyValidationStatus::OkExhausted => exhausted += 1,
            KeyValidationStatus::Unauthorized
            | KeyValidationStatus::Forbidden
            | KeyValidationStatus::Invalid => invalid += 1,
            KeyValidationStatus::Error => error += 1,
        }
    }

    ValidationCounts {
        pending,
        duplicate,
        ok,
        exhausted,
        invalid,
        error,
        checked: ok + exhausted + invalid + error,
        total_to_check: state.unique_in_input,
    }
}

/// Keys eligible for import: status `ok` or `ok_exhausted`. Deduplicated
/// defensively; first-seen order is preserved for stable display.
pub fn compute_valid_keys(state: &KeysValidationState) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for row in &state.rows {
        if row.status.is_success() && seen.insert(row.api_key.as_str()) {
            keys.push(row.api_key.clone());
        }
    }

    keys
}

/// Subset of the valid keys that will start with zero remaining quota.
pub fn compute_exhausted_keys(state: &KeysValidationState) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for row in &state.rows {
        if row.status == KeyValidationStatus::OkExhausted && seen.insert(row.api_key.as_str()) {
            keys.push(row.api_key.clone());
        }
    }

    keys
}
