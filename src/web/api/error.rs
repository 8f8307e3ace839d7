use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::interlink::{CatalogError, InterlinkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    ValidationFailed,
    InvalidOrbitalElements,
    InvalidScanConfig,
    PropagationFailed,
    SatelliteNotFound,
    CatalogUnavailable,
    InternalError,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Interlink(InterlinkError),
    NotFound(u64),
    CatalogUnavailable(String),
    Internal(String),
}

impl From<InterlinkError> for ApiError {
    fn from(e: InterlinkError) -> Self {
        ApiError::Interlink(e)
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::CatalogUnavailable(e.to_string())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Interlink(InterlinkError::Propagation { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Interlink(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::ValidationFailed,
            ApiError::Interlink(InterlinkError::InvalidOrbitalElements(_)) => {
                ErrorCode::InvalidOrbitalElements
            }
            ApiError::Interlink(InterlinkError::InvalidScanConfig(_)) => {
                ErrorCode::InvalidScanConfig
            }
            ApiError::Interlink(InterlinkError::Propagation { .. }) => {
                ErrorCode::PropagationFailed
            }
            ApiError::NotFound(_) => ErrorCode::SatelliteNotFound,
            ApiError::CatalogUnavailable(_) => ErrorCode::CatalogUnavailable,
            ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::CatalogUnavailable(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Interlink(e) => e.to_string(),
            ApiError::NotFound(norad_id) => format!("no satellite with NORAD id {}", norad_id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = (self.status(), self.code());
        let timestamp = match &self {
            ApiError::Interlink(InterlinkError::Propagation { timestamp, .. }) => Some(*timestamp),
            _ => None,
        };

        if status.is_server_error() {
            log::warn!("{}: {}", code, self.message());
        }

        let body = ErrorResponse {
            success: false,
            error: code.to_string(),
            message: Some(self.message()),
            timestamp,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Instant whose propagation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
