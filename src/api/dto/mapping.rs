//! DTOs for the admin mapping endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Record;
use crate::utils::short_url::PublicSite;

/// Admin view of a mapping. The password itself is never returned.
#[derive(Debug, Serialize, Deserialize)]
pub struct MappingDetails {
    pub mapping: String,
    pub short_url: String,
    pub url: String,
    pub protected: bool,
    pub hit_count: i64,
    pub max_hit_count: i64,
    pub limit_reached: bool,
    pub created_at: DateTime<Utc>,
}

impl MappingDetails {
    pub fn from_record(record: Record, site: &PublicSite) -> Self {
        Self {
            short_url: site.short_url(&record.mapping),
            protected: record.is_protected(),
            limit_reached: record.limit_reached(),
            hit_count: record.hit_count,
            max_hit_count: record.max_hit_count,
            created_at: record.created_at,
            mapping: record.mapping,
            url: record.url,
        }
    }
}
