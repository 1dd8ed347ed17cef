//! Top-level router.
//!
//! # Route Structure
//!
//! - `POST /short`    - create a mapping (host guarded)
//! - `GET  /{token}`  - resolve a mapping (host guarded)
//! - `GET  /health`   - store and cache health
//! - `/api/*`         - admin API, only when `ADMIN_TOKEN` is set (Bearer token)
//!
//! # Middleware
//!
//! - **Tracing** - per-request spans with latency
//! - **CORS** - allows the public origin for `GET`, `POST` and `OPTIONS`
//! - **Host guard** - redirects foreign hosts to the home page
//! - **Path normalization** - trailing slash handling

use crate::api;
use crate::api::handlers::resolve::KEY_HEADER;
use crate::api::handlers::{create_handler, health_handler, resolve_handler};
use crate::api::middleware::{auth, host_guard, tracing};
use crate::state::AppState;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Router without path normalization. Integration tests drive this directly.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/short", post(create_handler))
        .route("/{token}", get(resolve_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            host_guard::layer,
        ));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .merge(public);

    if state.admin_token.is_some() {
        let admin = api::routes::admin_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
        router = router.nest("/api", admin);
    }

    router
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(tracing::layer())
}

/// Full application router with trailing-slash normalization.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static(KEY_HEADER),
        ])
        .expose_headers([header::LOCATION]);

    match HeaderValue::from_str(&state.site.origin()) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            ::tracing::warn!("Public origin is not a valid header value; CORS disabled");
            cors
        }
    }
}
