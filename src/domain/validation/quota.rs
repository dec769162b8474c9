//! Quota checking seam
//!
//! The orchestrator sees a single async operation per key: either a quota
//! snapshot or a classified failure. The HTTP status → classification mapping
//! is fixed; UIs hardcode the resulting labels.

use async_trait::async_trait;
use std::fmt::Debug;

use super::row::KeyValidationStatus;

/// Upstream-reported quota for a key. Absent numbers are treated as
/// unspecified/ample, not as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyQuota {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
}

impl KeyQuota {
    pub fn new(limit: impl Into<Option<u64>>, remaining: impl Into<Option<u64>>) -> Self {
        Self {
            limit: limit.into(),
            remaining: remaining.into(),
        }
    }
}

/// Classified failure of one validation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaFailure {
    /// HTTP 401
    Unauthorized,
    /// HTTP 403
    Forbidden,
    /// Any other 4xx
    Rejected { status: u16 },
    /// 5xx from the upstream
    Upstream { status: u16 },
    /// Network failure or timeout before a status was obtained
    Transport { message: String },
}

impl QuotaFailure {
    /// Classify an HTTP status code. Success codes never reach this point.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            400..=499 => Self::Rejected { status },
            _ => Self::Upstream { status },
        }
    }

    /// Row status this failure maps to
    pub fn row_status(&self) -> KeyValidationStatus {
        match self {
            Self::Unauthorized => KeyValidationStatus::Unauthorized,
            Self::Forbidden => KeyValidationStatus::Forbidden,
            Self::Rejected { .. } => KeyValidationStatus::Invalid,
            Self::Upstream { .. } | Self::Transport { .. } => KeyValidationStatus::Error,
        }
    }

    /// Short diagnostic for the row. Deterministic per failure kind so
    /// repeated identical failures render identically.
    pub fn detail(&self) -> String {
        match self {
            Self::Unauthorized => "upstream returned HTTP 401".to_owned(),
            Self::Forbidden => "upstream returned HTTP 403".to_owned(),
            Self::Rejected { status } => format!("upstream rejected the key with HTTP {status}"),
            Self::Upstream { status } => format!("upstream error HTTP {status}"),
            Self::Transport { message } => format!("request failed: {message}"),
        }
    }
}

/// One validation request for one candidate key
#[async_trait]
pub trait QuotaChecker: Send + Sync + Debug {
    async fn check_key(&self, api_key: &str) -> Result<KeyQuota, QuotaFailure>;
}
