//! DTOs for the create endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{CreateMapping, CreatedMapping};

/// Body of `POST /short`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMappingRequest {
    /// Destination URL, stored as given.
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,

    /// Bot verification token, required when reCAPTCHA is configured.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default, alias = "maxhitcount", alias = "maxHitCount")]
    #[validate(range(min = 0, message = "max_hit_count must not be negative"))]
    pub max_hit_count: i64,
}

impl From<CreateMappingRequest> for CreateMapping {
    fn from(req: CreateMappingRequest) -> Self {
        CreateMapping {
            url: req.url,
            password: req.password,
            max_hit_count: req.max_hit_count,
            verification_token: req.token,
        }
    }
}

/// Response of `POST /short`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMappingResponse {
    pub url: String,
    /// Full short URL.
    pub mapping: String,
}

impl From<CreatedMapping> for CreateMappingResponse {
    fn from(created: CreatedMapping) -> Self {
        Self {
            url: created.url,
            mapping: created.mapping,
        }
    }
}
