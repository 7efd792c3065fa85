use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::application::FieldError;

#[derive(Debug, PartialEq, Eq)]
pub enum DatabaseError {
    /// Unique-constraint collision on referral code assignment. Retried by
    /// the caller with a re-read of the latest code.
    Conflict,
    ServerError,
}

pub enum ApiError {
    AccessDenied,
    InvalidReferrer,
    Validation(Vec<FieldError>),
    IneligibleCategory,
    CodeConflict,
    NotFound,
    AuthenticationError,
    ServerError,
}

impl From<DatabaseError> for ApiError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::Conflict => Self::CodeConflict,
            DatabaseError::ServerError => Self::ServerError,
        }
    }
}

// Visitor-facing bodies stay generic; developer detail goes to tracing at the
// point of failure.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Self::AccessDenied => (StatusCode::FORBIDDEN, json!({ "error": "Access denied" })),
            Self::InvalidReferrer => (StatusCode::FORBIDDEN, json!({ "error": "Invalid referrer" })),
            Self::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            Self::IneligibleCategory => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Category is not eligible for a referral code" }),
            ),
            Self::CodeConflict => (
                StatusCode::CONFLICT,
                json!({ "error": "Could not issue a referral code, try again" }),
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
            Self::AuthenticationError => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication failed" }),
            ),
            Self::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Something went wrong" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug)]
pub enum JWTError {
    GenerationFailed(jsonwebtoken::errors::ErrorKind),
    DecodeFailed(jsonwebtoken::errors::ErrorKind),
}

impl From<JWTError> for ApiError {
    fn from(_value: JWTError) -> Self {
        Self::AuthenticationError
    }
}
