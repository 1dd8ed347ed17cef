//! HTTP request handlers.

pub mod admin;
pub mod create;
pub mod health;
pub mod resolve;

pub use admin::{delete_mapping_handler, get_mapping_handler};
pub use create::create_handler;
pub use health::health_handler;
pub use resolve::resolve_handler;
