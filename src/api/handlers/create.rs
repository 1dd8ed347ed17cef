//! Handler for mapping creation.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::create::{CreateMappingRequest, CreateMappingResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short mapping.
///
/// # Endpoint
///
/// `POST /short`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.org/page",
///   "password": "optional",
///   "max_hit_count": 0,
///   "token": "recaptcha-token"
/// }
/// ```
///
/// # Response
///
/// `201 Created` for a new mapping, `200 OK` when an existing public mapping for
/// the same URL was reused:
///
/// ```json
/// { "url": "https://example.org/page", "mapping": "http://localhost:3000/aB3xK9q" }
/// ```
///
/// # Errors
///
/// `400` for malformed JSON, an invalid URL or failed bot verification.
pub async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateMappingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateMappingResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    payload.validate()?;

    let created = state.resolver.create_mapping(payload.into()).await?;

    let status = if created.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(created.into())))
}
