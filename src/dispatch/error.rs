use std::time::Duration;
use thiserror::Error;

/// Failures raised while walking the handler chain
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("Invalid value for header '{name}': {value}")]
    InvalidHeaderValue { name: String, value: String },

    #[error("Handler '{handler}' failed: {message}")]
    Handler { handler: &'static str, message: String },

    #[error("Request was not terminated within {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    pub fn handler(handler: &'static str, message: impl Into<String>) -> Self {
        DispatchError::Handler {
            handler,
            message: message.into(),
        }
    }
}
