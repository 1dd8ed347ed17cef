//! Request and response bodies.

pub mod create;
pub mod health;
pub mod mapping;
