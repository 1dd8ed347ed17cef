//! Application layer.
//!
//! Orchestrates the domain contracts: token allocation, URL dedup, access
//! checks and hit counting. HTTP handlers and the admin CLI call in here.
//!
//! - [`services::MappingResolver`] - create, resolve, inspect and delete mappings
//! - [`services::HitCounter`] - hit bookkeeping and limit reporting

pub mod services;
