//! JSON error responses shared by the HTTP subsystems.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

/// An error rendered as `{"error": ..., "message": ...}`.
#[derive(Debug, Clone, Copy)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: &'static str,
}

impl ApiError {
    pub const NOT_FOUND: ApiError = ApiError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: "Resource not found",
    };

    pub const UNAUTHORIZED: ApiError = ApiError {
        status: StatusCode::UNAUTHORIZED,
        code: "unauthorized",
        message: "Missing or invalid credentials",
    };
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Fallback handler for unmatched paths inside a subsystem namespace.
pub async fn not_found() -> ApiError {
    ApiError::NOT_FOUND
}
