//! API error handling.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    /// The repository's own configuration cannot be built.
    Unprocessable(String),
    /// An external service call failed.
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<shepherd_core::Error> for ApiError {
    fn from(err: shepherd_core::Error) -> Self {
        use shepherd_core::Error;

        let cause = std::error::Error::source(&err).map(ToString::to_string);
        error!(error = %err, cause = ?cause, "Activation failed");

        match err {
            Error::InvalidEvent(_) => ApiError::BadRequest(err.to_string()),
            Error::Settings(_) | Error::UnsupportedImage(_) => {
                ApiError::Unprocessable(err.to_string())
            }
            Error::Upstream { .. } | Error::Provisioning { .. } | Error::Dispatch { .. } => {
                ApiError::BadGateway(err.to_string())
            }
            Error::Decryption(_) | Error::Config(_) => ApiError::Internal(err.to_string()),
        }
    }
}
