//! HTTP API error types

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::dispatch::DispatchError;

/// HTTP-facing error with status code and client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 408 Request Timeout
    RequestTimeout(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::RequestTimeout(_) => 408,
            ApiError::InternalServerError(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::RequestTimeout(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::RequestTimeout(_) => "REQUEST_TIMEOUT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }

    pub fn request_timeout(message: impl Into<String>) -> Self {
        ApiError::RequestTimeout(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Timeout(limit) => {
                ApiError::request_timeout(format!("Request was not completed within {:?}", limit))
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Dispatch error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timeout_maps_to_408() {
        let err = ApiError::from(DispatchError::Timeout(Duration::from_millis(10)));
        assert_eq!(err.status_code(), 408);
        assert_eq!(err.error_code(), "REQUEST_TIMEOUT");
    }

    #[test]
    fn handler_failures_hide_details() {
        let err = ApiError::from(DispatchError::handler("hello_world", "secret detail"));
        assert_eq!(err.status_code(), 500);
        assert!(!err.message().contains("secret"));
    }

    #[test]
    fn json_body_shape() {
        let body = ApiError::request_timeout("too slow").to_json();
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "too slow");
        assert_eq!(body["code"], "REQUEST_TIMEOUT");
    }
}
