//! Validation domain: key extraction, per-row state, derived counts, and the
//! quota checking seam.

pub mod counts;
pub mod extract;
pub mod quota;
pub mod row;

pub use counts::{
    compute_exhausted_keys, compute_valid_keys, compute_validation_counts, ValidationCounts,
};
pub use extract::{extract_key_from_line, parse_key_input, ParsedKeys};
pub use quota::{KeyQuota, QuotaChecker, QuotaFailure};
pub use row::{KeyValidationRow, KeyValidationStatus, KeysValidationState};
