//! Host extraction from HTTP requests.

use crate::AppError;
use axum::http::{HeaderMap, Uri, header};

/// Extracts the requested host (including any port) from a request.
///
/// Reads the `Host` header first and falls back to the URI authority, which is
/// where HTTP/2 clients put it. The value is returned as sent, port included.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if:
/// - Neither a `Host` header nor a URI authority is present
/// - The header value contains invalid UTF-8
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "example.com:8080".parse().unwrap());
///
/// let host = extract_host(&headers, &Uri::from_static("/abc")).unwrap();
/// assert_eq!(host, "example.com:8080");
/// ```
pub fn extract_host(headers: &HeaderMap, uri: &Uri) -> Result<String, AppError> {
    if let Some(value) = headers.get(header::HOST) {
        let host = value
            .to_str()
            .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?;
        return Ok(host.to_string());
    }

    uri.authority()
        .map(|authority| authority.as_str().to_string())
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))
}

/// Compares a requested host against the expected `domain[:port]`.
///
/// Domain names are case-insensitive.
pub fn host_matches(host: &str, expected: &str) -> bool {
    host.eq_ignore_ascii_case(expected)
}
