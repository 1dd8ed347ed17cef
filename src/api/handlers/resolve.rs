//! Handler for token resolution.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, warn};

use crate::application::services::Resolution;
use crate::error::{AppError, error_response};
use crate::state::AppState;

/// Request header carrying the password of a protected mapping.
pub const KEY_HEADER: &str = "key";

/// Resolves a token.
///
/// # Endpoint
///
/// `GET /{token}`, with an optional `Key: <password>` header.
///
/// # Responses
///
/// - **307** to the destination for a public mapping
/// - **202** with `Location` for a protected mapping and the right key
/// - **401** `credential_required` when the key is missing
/// - **403** `access_denied` when the key is wrong
/// - **410** `limit_reached` once the hit limit is used up under the `reject` policy
/// - **302** to the home page for an unknown token
pub async fn resolve_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    // Raw bytes: passwords may be any UTF-8, which `to_str` would reject.
    let credential = headers.get(KEY_HEADER).map(HeaderValue::as_bytes);

    let resolution = match state.resolver.resolve_mapping(&token, credential).await {
        Ok(resolution) => resolution,
        Err(AppError::UnknownMapping { .. }) => {
            debug!(token = %token, "Unknown mapping, sending to home page");
            return Ok(redirect(StatusCode::FOUND, &state.site.home_url()));
        }
        Err(e) => return Err(e),
    };

    let response = match resolution {
        Resolution::Granted {
            url,
            protected: false,
            ..
        } => redirect(StatusCode::TEMPORARY_REDIRECT, &url),
        Resolution::Granted {
            url,
            protected: true,
            ..
        } => redirect(StatusCode::ACCEPTED, &url),
        Resolution::NeedCredential => {
            let mut response = error_response(
                StatusCode::UNAUTHORIZED,
                "credential_required",
                "This mapping is password protected",
                json!({ "header": "Key" }),
            );
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Key"));
            response
        }
        Resolution::Denied => error_response(
            StatusCode::FORBIDDEN,
            "access_denied",
            "Invalid key",
            json!({}),
        ),
        Resolution::LimitReached => error_response(
            StatusCode::GONE,
            "limit_reached",
            "This mapping has reached its hit limit",
            json!({ "mapping": token }),
        ),
    };

    Ok(response)
}

/// Builds a response with a `Location` header.
///
/// Stored URLs are arbitrary user input; one that is not a valid header value
/// yields 500 instead of a panic.
fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            warn!(location, "Stored URL is not a valid Location header");
            AppError::internal("Stored URL cannot be redirected to", json!({})).into_response()
        }
    }
}
