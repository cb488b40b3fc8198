//! Proxy error types.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::inference::ProviderError;

/// Convenience alias for handler return types.
pub type ApiResult<T> = Result<T, ApiError>;

/// Body of every non-200 response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Proxy-level errors with HTTP status mapping.
///
/// The `Display` text is exactly what the client sees in `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,

    #[error("{0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Upstream(#[from] ProviderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        match self {
            ApiError::MethodNotAllowed => (status, [(header::ALLOW, "POST")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
