//! Infrastructure layer.
//!
//! Concrete implementations of the domain contracts.
//!
//! - [`cache`] - mapping cache (Redis and no-op)
//! - [`persistence`] - mapping store backends
//! - [`verification`] - bot verification backends

pub mod cache;
pub mod persistence;
pub mod verification;
