//! Admin API routes.

use crate::api::handlers::{delete_mapping_handler, get_mapping_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Routes nested under `/api`, protected by bearer authentication.
///
/// - `GET    /mappings/{token}` - inspect a mapping
/// - `DELETE /mappings/{token}` - delete a mapping
pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/mappings/{token}",
        get(get_mapping_handler).delete(delete_mapping_handler),
    )
}
