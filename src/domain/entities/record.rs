//! Record entity binding a short token to a destination URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the store on insert.
pub type RecordId = i64;

/// A persisted mapping.
///
/// `mapping` is globally unique. `password` is empty for public mappings;
/// `max_hit_count == 0` means the mapping has no hit ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub url: String,
    pub mapping: String,
    pub password: String,
    pub hit_count: i64,
    pub max_hit_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Returns true if resolving this mapping requires a credential.
    pub fn is_protected(&self) -> bool {
        !self.password.is_empty()
    }

    /// Returns true if a hit ceiling was set at creation.
    pub fn has_hit_limit(&self) -> bool {
        self.max_hit_count > 0
    }

    /// Returns true if the mapping is eligible for URL dedup.
    pub fn is_public(&self) -> bool {
        !self.is_protected() && !self.has_hit_limit()
    }

    /// Returns true once `hit_count` has reached a configured ceiling.
    pub fn limit_reached(&self) -> bool {
        self.has_hit_limit() && self.hit_count >= self.max_hit_count
    }
}

/// Input data for creating a new record. Hit count always starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub url: String,
    pub mapping: String,
    pub password: String,
    pub max_hit_count: i64,
}

/// Aggregate counters used by the admin CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total: i64,
    pub protected: i64,
    pub total_hits: i64,
}
