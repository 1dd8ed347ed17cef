//! Redirects requests that did not arrive on the public host.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::state::AppState;
use crate::utils::extract_host::{extract_host, host_matches};

/// Sends `301 Moved Permanently` to the home page unless `Host` equals the
/// configured `domain[:port]`.
///
/// Disabled when [`AppState::enforce_host`] is false.
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    if !st.enforce_host {
        return next.run(req).await;
    }

    let expected = st.site.expected_host();
    let allowed = extract_host(req.headers(), req.uri())
        .map(|host| host_matches(&host, &expected))
        .unwrap_or(false);

    if allowed {
        return next.run(req).await;
    }

    debug!(expected = %expected, "Request for foreign host, redirecting");

    match HeaderValue::from_str(&st.site.home_url()) {
        Ok(location) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response(),
        Err(_) => StatusCode::MISDIRECTED_REQUEST.into_response(),
    }
}
