//! Storage contract for mapping records.

use crate::domain::entities::{NewRecord, Record, RecordId, StoreStats};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a [`MappingStore`] backend.
///
/// Lookup misses are not errors; they are reported as `None` / `false`.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The mapping token is already taken. Raised by `insert` only.
    #[error("mapping already exists: {0}")]
    Conflict(String),
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

/// Result of [`MappingStore::increment_hit_count_within_limit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundedIncrement {
    /// The hit was counted; carries the updated record.
    Counted(Record),
    /// The record already sits at its ceiling and was left unchanged.
    AtLimit(Record),
}

/// Repository interface for mapping records.
///
/// Every call is a self-contained round trip to the backend. Implementations own
/// their connections for the whole process lifetime.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingStore`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryMappingStore`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Inserts a new record with `hit_count = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if `mapping` already exists. Callers treat
    /// this as a signal to retry with a fresh token.
    async fn insert(&self, new_record: NewRecord) -> StoreResult<RecordId>;

    /// Finds a record by its token.
    async fn find_by_mapping(&self, mapping: &str) -> StoreResult<Option<Record>>;

    /// Finds any record pointing at `url`.
    ///
    /// When several records match, public unlimited ones are preferred. The choice
    /// is otherwise arbitrary but stable within one lookup.
    async fn find_by_url(&self, url: &str) -> StoreResult<Option<Record>>;

    /// Atomically increments `hit_count` by one and returns the updated record.
    ///
    /// Returns `Ok(None)` if no record has this token.
    async fn increment_hit_count(&self, mapping: &str) -> StoreResult<Option<Record>>;

    /// Increments `hit_count` only while it is below a non-zero `max_hit_count`.
    ///
    /// The check and the increment happen in one atomic step, so concurrent callers
    /// can never push the count past the ceiling. Returns `Ok(None)` if no record
    /// has this token.
    async fn increment_hit_count_within_limit(
        &self,
        mapping: &str,
    ) -> StoreResult<Option<BoundedIncrement>>;

    /// Deletes a record. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, mapping: &str) -> StoreResult<bool>;

    /// Aggregate counters over all records.
    async fn stats(&self) -> StoreResult<StoreStats>;

    /// Checks that the backend answers.
    async fn health_check(&self) -> bool;
}
