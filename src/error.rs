//! Application error type and its HTTP representation.
//!
//! Every fallible engine operation returns [`AppError`]. Access-control outcomes
//! (credential required, access denied, hit limit reached) are *not* errors; they are
//! reported through [`crate::application::services::Resolution`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::repositories::StoreError;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorInfo,
}

/// Machine-readable error payload shared by all JSON error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    InvalidUrl { message: String, details: Value },
    #[error("{message}")]
    UnknownMapping { message: String, details: Value },
    #[error("{message}")]
    VerificationFailed { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    GenerationExhausted { message: String, details: Value },
    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            details,
        }
    }
    pub fn unknown_mapping(message: impl Into<String>, details: Value) -> Self {
        Self::UnknownMapping {
            message: message.into(),
            details,
        }
    }
    pub fn verification_failed(message: impl Into<String>, details: Value) -> Self {
        Self::VerificationFailed {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn generation_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::GenerationExhausted {
            message: message.into(),
            details,
        }
    }
    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status code for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidUrl { .. }
            | Self::VerificationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownMapping { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::GenerationExhausted { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable error code used in JSON bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::UnknownMapping { .. } => "unknown_mapping",
            Self::VerificationFailed { .. } => "verification_failed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::GenerationExhausted { .. } => "generation_exhausted",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = self.parts();
        ErrorInfo {
            code: self.code(),
            message: message.clone(),
            details: details.clone(),
        }
    }

    fn parts(&self) -> (&String, &Value) {
        match self {
            Self::Validation { message, details }
            | Self::InvalidUrl { message, details }
            | Self::UnknownMapping { message, details }
            | Self::VerificationFailed { message, details }
            | Self::Unauthorized { message, details }
            | Self::GenerationExhausted { message, details }
            | Self::StoreUnavailable { message, details }
            | Self::Internal { message, details } => (message, details),
        }
    }
}

/// Builds a JSON error response in the shared `{"error": {...}}` shape.
pub fn error_response(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    details: Value,
) -> Response {
    let body = ErrorBody {
        error: ErrorInfo {
            code,
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let info = self.to_error_info();

        if status.is_server_error() {
            tracing::error!(code = info.code, details = %info.details, "{}", info.message);
        }

        let mut response = error_response(status, info.code, info.message, info.details);
        if matches!(self, Self::Unauthorized { .. }) {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(reason) => AppError::store_unavailable(
                "Mapping store is unavailable",
                json!({ "reason": reason }),
            ),
            StoreError::Conflict(mapping) => AppError::internal(
                "Mapping already exists",
                json!({ "mapping": mapping }),
            ),
            StoreError::InvalidData(reason) => {
                AppError::internal("Stored mapping is invalid", json!({ "reason": reason }))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(errors.field_errors()).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
