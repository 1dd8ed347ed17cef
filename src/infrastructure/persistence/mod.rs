//! Mapping store backends.
//!
//! - [`PgMappingStore`] - PostgreSQL, the production backend
//! - [`MemoryMappingStore`] - process-local map for development and tests

pub mod memory_mapping_store;
pub mod pg_mapping_store;

pub use memory_mapping_store::MemoryMappingStore;
pub use pg_mapping_store::PgMappingStore;
