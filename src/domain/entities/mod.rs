//! Core domain entities.
//!
//! - [`Record`] - A persisted token-to-URL mapping
//! - [`NewRecord`] - Input for creating a record
//! - [`StoreStats`] - Aggregate counters reported by the store

pub mod record;

pub use record::{NewRecord, Record, RecordId, StoreStats};
