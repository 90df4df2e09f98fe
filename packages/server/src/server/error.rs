//! HTTP shapes for application errors.
//!
//! Every response body is the same envelope: `{"success": true, "data": ...}`
//! on the happy path, `{"success": false, "message": ...}` otherwise. The
//! message is always `AppError`'s display text, so handlers never compose
//! user-facing strings themselves.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::common::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::AlreadyRegistered | AppError::Conflict => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(err) => {
                // The client only ever sees "Server error"; the cause goes
                // to the log.
                error!("internal error: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Wraps payload data in the success envelope.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "data": data,
        })),
    )
        .into_response()
}
