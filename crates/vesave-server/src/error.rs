//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use vesave_core::VeSaveError;

pub const CODE_INVALID_INPUT: &str = "INVALID_INPUT";
pub const CODE_UNKNOWN_SESSION: &str = "UNKNOWN_SESSION";
pub const CODE_UPSTREAM: &str = "UPSTREAM_ERROR";
pub const CODE_INTERNAL: &str = "INTERNAL_ERROR";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, CODE_INVALID_INPUT, message)
    }

    pub fn unknown_session(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, CODE_UNKNOWN_SESSION, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, CODE_INTERNAL, message)
    }

    /// Upstream failures keep the upstream status code when there is one.
    pub fn upstream(err: VeSaveError) -> Self {
        let status = err
            .http_status()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, CODE_UPSTREAM, err.to_string())
    }
}

impl From<VeSaveError> for ApiError {
    fn from(err: VeSaveError) -> Self {
        match err {
            VeSaveError::InvalidInput(message) => Self::invalid_input(message),
            VeSaveError::NotFound { .. } => Self::unknown_session("Unknown session."),
            VeSaveError::Http { .. } | VeSaveError::Upstream(_) => Self::upstream(err),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}
