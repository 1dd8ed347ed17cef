//! HTTP API layer.
//!
//! - [`dto`] - request/response bodies
//! - [`handlers`] - endpoint handlers
//! - [`middleware`] - authentication, host guard and tracing
//! - [`routes`] - admin route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
