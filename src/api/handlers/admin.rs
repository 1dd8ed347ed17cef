//! Admin handlers for individual mappings.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::api::dto::mapping::MappingDetails;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/mappings/{token}`
///
/// Returns the mapping with its counters; the password is not included.
pub async fn get_mapping_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MappingDetails>, AppError> {
    let record = state.resolver.inspect_mapping(&token).await?;
    Ok(Json(MappingDetails::from_record(record, &state.site)))
}

/// `DELETE /api/mappings/{token}`
///
/// Returns 204 on success, 404 if the mapping does not exist.
pub async fn delete_mapping_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.resolver.delete_mapping(&token).await?;
    info!(token = %token, "Mapping deleted via admin API");
    Ok(StatusCode::NO_CONTENT)
}
