//! PostgreSQL implementation of the mapping store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewRecord, Record, RecordId, StoreStats};
use crate::domain::repositories::{BoundedIncrement, MappingStore, StoreError, StoreResult};

/// Name of the unique constraint on `mappings.mapping`.
const MAPPING_UNIQUE_CONSTRAINT: &str = "mappings_mapping_key";

/// PostgreSQL mapping store.
///
/// Uniqueness of `mapping` is enforced by the `mappings_mapping_key` constraint;
/// a violation surfaces as [`StoreError::Conflict`]. Connections come from a
/// shared pool and are released after each query.
pub struct PgMappingStore {
    pool: Arc<PgPool>,
}

impl PgMappingStore {
    /// Creates a new store over a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    url: String,
    mapping: String,
    password: String,
    hit_count: i64,
    max_hit_count: i64,
    created_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        Record {
            id: row.id,
            url: row.url,
            mapping: row.mapping,
            password: row.password,
            hit_count: row.hit_count,
            max_hit_count: row.max_hit_count,
            created_at: row.created_at,
        }
    }
}

fn is_mapping_conflict(err: &sqlx::Error) -> bool {
    let Some(db_err) = err.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(MAPPING_UNIQUE_CONSTRAINT) | None)
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = err.to_string();

    match err {
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => StoreError::InvalidData(message),
        _ => StoreError::Unavailable(message),
    }
}

#[async_trait]
impl MappingStore for PgMappingStore {
    async fn insert(&self, new_record: NewRecord) -> StoreResult<RecordId> {
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO mappings (mapping, url, password, max_hit_count)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&new_record.mapping)
        .bind(&new_record.url)
        .bind(&new_record.password)
        .bind(new_record.max_hit_count)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(err) if is_mapping_conflict(&err) => Err(StoreError::Conflict(new_record.mapping)),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn find_by_mapping(&self, mapping: &str) -> StoreResult<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, url, mapping, password, hit_count, max_hit_count, created_at
            FROM mappings
            WHERE mapping = $1
            "#,
        )
        .bind(mapping)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Record::from))
    }

    async fn find_by_url(&self, url: &str) -> StoreResult<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, url, mapping, password, hit_count, max_hit_count, created_at
            FROM mappings
            WHERE url = $1
            ORDER BY (password = '' AND max_hit_count = 0) DESC, id ASC
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Record::from))
    }

    async fn increment_hit_count(&self, mapping: &str) -> StoreResult<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE mappings
            SET hit_count = hit_count + 1
            WHERE mapping = $1
            RETURNING id, url, mapping, password, hit_count, max_hit_count, created_at
            "#,
        )
        .bind(mapping)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Record::from))
    }

    async fn increment_hit_count_within_limit(
        &self,
        mapping: &str,
    ) -> StoreResult<Option<BoundedIncrement>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE mappings
            SET hit_count = hit_count + 1
            WHERE mapping = $1
              AND (max_hit_count = 0 OR hit_count < max_hit_count)
            RETURNING id, url, mapping, password, hit_count, max_hit_count, created_at
            "#,
        )
        .bind(mapping)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        if let Some(row) = row {
            return Ok(Some(BoundedIncrement::Counted(row.into())));
        }

        // Either the token is unknown or the record is at its ceiling.
        Ok(self
            .find_by_mapping(mapping)
            .await?
            .map(BoundedIncrement::AtLimit))
    }

    async fn delete(&self, mapping: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM mappings WHERE mapping = $1")
            .bind(mapping)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        let (total, protected, total_hits) = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE password <> ''),
                COALESCE(SUM(hit_count), 0)::BIGINT
            FROM mappings
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(StoreStats {
            total,
            protected,
            total_hits,
        })
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
