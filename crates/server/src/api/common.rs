//! Shared helpers and type aliases for API handlers.

use axum::http::StatusCode;
use axum::Json;

use super::ErrorResponse;

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);
pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: msg.into() }))
}

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    error(StatusCode::BAD_REQUEST, msg)
}

pub(crate) fn internal_error(e: impl std::fmt::Display) -> ApiError {
    error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub(crate) fn not_found(resource: &str, id: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, format!("{} not found: {}", resource, id))
}

pub(crate) fn conflict(msg: impl Into<String>) -> ApiError {
    error(StatusCode::CONFLICT, msg)
}
