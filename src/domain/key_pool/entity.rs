//! Key pool entity
//!
//! A pool key is identified by its full key string; there is no separate id.
//! Deletion is soft so that re-importing a removed key can be reported as
//! `undeleted` rather than `created`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a key held in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PoolKeyStatus {
    /// Key can be handed out to callers
    #[default]
    Active,
    /// Key is valid but its quota is spent for the current period
    Exhausted,
    /// Key was removed by an administrator; retained for undelete semantics
    Deleted,
}

/// A key stored in the pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolKey {
    api_key: String,
    group: String,
    status: PoolKeyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    quota_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quota_remaining: Option<u64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PoolKey {
    /// Create a new active pool key
    pub fn new(api_key: impl Into<String>, group: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            api_key: api_key.into(),
            group: group.into(),
            status: PoolKeyStatus::Active,
            quota_limit: None,
            quota_remaining: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the quota snapshot observed at import time
    pub fn with_quota(mut self, limit: Option<u64>, remaining: Option<u64>) -> Self {
        self.quota_limit = limit;
        self.quota_remaining = remaining;
        if remaining == Some(0) {
            self.status = PoolKeyStatus::Exhausted;
        }
        self
    }

    // Getters

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn status(&self) -> PoolKeyStatus {
        self.status
    }

    pub fn quota_limit(&self) -> Option<u64> {
        self.quota_limit
    }

    pub fn quota_remaining(&self) -> Option<u64> {
        self.quota_remaining
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.status == PoolKeyStatus::Deleted
    }

    // Mutators

    /// Soft-delete the key
    pub fn mark_deleted(&mut self) {
        self.status = PoolKeyStatus::Deleted;
        self.touch();
    }

    /// Bring a soft-deleted key back into service under a (possibly new)
    /// group.
    pub fn undelete(&mut self, group: impl Into<String>) {
        self.group = group.into();
        self.status = if self.quota_remaining == Some(0) {
            PoolKeyStatus::Exhausted
        } else {
            PoolKeyStatus::Active
        };
        self.touch();
    }

    /// Record a fresh quota observation
    pub fn set_quota(&mut self, limit: Option<u64>, remaining: Option<u64>) {
        self.quota_limit = limit;
        self.quota_remaining = remaining;
        if self.status != PoolKeyStatus::Deleted {
            self.status = if remaining == Some(0) {
                PoolKeyStatus::Exhausted
            } else {
                PoolKeyStatus::Active
            };
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
