//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`. Mock
//! implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`MappingStore`] - Record CRUD and atomic hit counting, optionally bounded

pub mod mapping_store;

pub use mapping_store::{BoundedIncrement, MappingStore, StoreError, StoreResult};

#[cfg(test)]
pub use mapping_store::MockMappingStore;
