//! Destination URL validation.

use serde_json::json;
use url::Url;

use crate::error::AppError;

/// Checks that `input` is a well-formed absolute URI with a host.
///
/// The URL is stored exactly as supplied; no normalization is applied. Schemes
/// without an authority (`mailto:`, `javascript:`, `data:`) are rejected.
///
/// # Errors
///
/// Returns [`AppError::InvalidUrl`] if parsing fails or the URL has no host.
pub fn validate_target_url(input: &str) -> Result<(), AppError> {
    if input.trim().is_empty() {
        return Err(AppError::invalid_url("URL must not be empty", json!({})));
    }

    let url = Url::parse(input).map_err(|e| {
        AppError::invalid_url(
            "URL is not a valid absolute URI",
            json!({ "url": input, "reason": e.to_string() }),
        )
    })?;

    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::invalid_url(
            "URL must include a host",
            json!({ "url": input }),
        ));
    }

    Ok(())
}
