//! Bearer token authentication for the admin API.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::{error::AppError, state::AppState};

/// Requires `Authorization: Bearer <ADMIN_TOKEN>`.
///
/// The token is compared in constant time. When no admin token is configured
/// every request is rejected.
///
/// # Errors
///
/// `401 Unauthorized` with `WWW-Authenticate: Bearer` if the header is missing,
/// malformed or carries the wrong token.
///
/// # Example
///
/// ```rust,ignore
/// let admin = admin_routes()
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let Some(expected) = st.admin_token.as_deref() else {
        return Err(AppError::unauthorized(
            "Unauthorized",
            json!({"reason": "Admin API is disabled"}),
        ));
    };

    if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(AppError::unauthorized(
            "Unauthorized",
            json!({"reason": "Invalid token"}),
        ));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
