//! Custom error types for the albums service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use thiserror::Error;

use crate::models::envelope::ApiResponse;

/// Custom error type for the albums service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// A referenced user or event type does not exist
    #[error("{0}")]
    Reference(String),

    /// The album's expiry date has passed
    #[error("{0}")]
    Expired(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate share or identifier
    #[error("{0}")]
    Conflict(String),

    /// No bearer token supplied
    #[error("Access token is required")]
    Unauthorized,

    /// Invalid token or insufficient rights
    #[error("{0}")]
    Forbidden(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl ApiError {
    /// Whether the failure is on the server side rather than the caller's
    pub fn is_internal(&self) -> bool {
        match self {
            ApiError::Database(DatabaseError::UniqueViolation(_)) => false,
            ApiError::Database(_) => true,
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Reference(_) | ApiError::Expired(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Database(DatabaseError::UniqueViolation(_)) => {
                ApiResponse::<()>::failure("Resource already exists")
            }
            err if err.is_internal() => {
                ApiResponse::<()>::failure("Internal server error").with_error(err.to_string())
            }
            err => ApiResponse::<()>::failure(err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
