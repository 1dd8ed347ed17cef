//! Utility functions for token generation, URL handling, and request inspection.
//!
//! - [`token_generator`] - Random token generation
//! - [`short_url`] - Public short URL formatting
//! - [`url_validator`] - Destination URL validation
//! - [`extract_host`] - Host extraction from HTTP requests

pub mod extract_host;
pub mod short_url;
pub mod token_generator;
pub mod url_validator;
