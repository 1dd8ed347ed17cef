//! HTTP middleware: admin authentication, host enforcement and tracing.

pub mod auth;
pub mod host_guard;
pub mod tracing;
