//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"error": {"code", "message", "field"?}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use patient_service::PatientError;
use serde::Serialize;

/// Message sent for storage outages; driver text stays in the logs.
pub const UNAVAILABLE_MESSAGE: &str = "service temporarily unavailable";

/// Message sent for internal failures.
pub const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("No route for {0}")]
    NoRoute(String),
    #[error(transparent)]
    Patient(#[from] PatientError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn no_route(path: impl Into<String>) -> Self {
        Self::NoRoute(path.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoRoute(_) => StatusCode::NOT_FOUND,
            ApiError::Patient(e) => match e {
                PatientError::InvalidInput { .. } | PatientError::InvalidData { .. } => {
                    StatusCode::BAD_REQUEST
                }
                PatientError::DuplicateKey { .. } => StatusCode::CONFLICT,
                PatientError::NotFound { .. } => StatusCode::NOT_FOUND,
                PatientError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                PatientError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::BadRequest(_) => "INVALID_INPUT",
            ApiError::NoRoute(_) => "NOT_FOUND",
            ApiError::Patient(e) => e.code(),
        }
    }

    /// The message shown to the client.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg) | ApiError::BadRequest(msg) => msg.clone(),
            ApiError::NoRoute(_) => self.to_string(),
            ApiError::Patient(PatientError::StorageUnavailable { .. }) => {
                UNAVAILABLE_MESSAGE.to_string()
            }
            ApiError::Patient(PatientError::Internal { .. }) => INTERNAL_MESSAGE.to_string(),
            ApiError::Patient(e) => e.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let field = match self {
            ApiError::Patient(e) => e.field(),
            _ => None,
        };
        ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.public_message(),
                field,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), status = status.as_u16(), "Request rejected");
        }
        (status, Json(self.to_body())).into_response()
    }
}
