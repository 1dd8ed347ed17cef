//! In-process mapping store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

use crate::domain::entities::{NewRecord, Record, RecordId, StoreStats};
use crate::domain::repositories::{BoundedIncrement, MappingStore, StoreError, StoreResult};

/// Mapping store backed by a sharded concurrent map keyed by token.
///
/// Insertion goes through the map's entry API, so two concurrent inserts of the
/// same token cannot both succeed. Data lives only as long as the process.
#[derive(Debug)]
pub struct MemoryMappingStore {
    records: DashMap<String, Record>,
    next_id: AtomicI64,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        debug!("Using in-memory mapping store");
        Self {
            records: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryMappingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn insert(&self, new_record: NewRecord) -> StoreResult<RecordId> {
        match self.records.entry(new_record.mapping.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(new_record.mapping)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                slot.insert(Record {
                    id,
                    url: new_record.url,
                    mapping: new_record.mapping,
                    password: new_record.password,
                    hit_count: 0,
                    max_hit_count: new_record.max_hit_count,
                    created_at: Utc::now(),
                });
                Ok(id)
            }
        }
    }

    async fn find_by_mapping(&self, mapping: &str) -> StoreResult<Option<Record>> {
        Ok(self.records.get(mapping).map(|r| r.value().clone()))
    }

    async fn find_by_url(&self, url: &str) -> StoreResult<Option<Record>> {
        let best = self
            .records
            .iter()
            .filter(|r| r.url == url)
            .map(|r| r.value().clone())
            .min_by_key(|r| (!r.is_public(), r.id));

        Ok(best)
    }

    async fn increment_hit_count(&self, mapping: &str) -> StoreResult<Option<Record>> {
        Ok(self.records.get_mut(mapping).map(|mut r| {
            r.hit_count += 1;
            r.value().clone()
        }))
    }

    async fn increment_hit_count_within_limit(
        &self,
        mapping: &str,
    ) -> StoreResult<Option<BoundedIncrement>> {
        Ok(self.records.get_mut(mapping).map(|mut r| {
            if r.limit_reached() {
                BoundedIncrement::AtLimit(r.value().clone())
            } else {
                r.hit_count += 1;
                BoundedIncrement::Counted(r.value().clone())
            }
        }))
    }

    async fn delete(&self, mapping: &str) -> StoreResult<bool> {
        Ok(self.records.remove(mapping).is_some())
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        let stats = self
            .records
            .iter()
            .fold(StoreStats::default(), |mut acc, r| {
                acc.total += 1;
                if r.is_protected() {
                    acc.protected += 1;
                }
                acc.total_hits += r.hit_count;
                acc
            });

        Ok(stats)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
