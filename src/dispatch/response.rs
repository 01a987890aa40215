use axum::{
    body::Body,
    http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::dispatch::error::DispatchError;

/// Response under construction while a request walks the chain.
///
/// A handler terminates the chain by calling [`ResponseWriter::end`]. Once
/// ended, further header or body writes are ignored.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<String>,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Whether a handler has produced the final body
    pub fn is_ended(&self) -> bool {
        self.body.is_some()
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        if self.is_ended() {
            tracing::warn!("Ignoring status {} set after response ended", status);
            return self;
        }
        self.status = status;
        self
    }

    /// Set a header, replacing any previous value with the same name.
    ///
    /// Any syntactically valid header name is accepted, including
    /// non-standard ones.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<&mut Self, DispatchError> {
        if self.is_ended() {
            tracing::warn!("Ignoring header '{}' set after response ended", name);
            return Ok(self);
        }

        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| DispatchError::InvalidHeaderName(name.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| DispatchError::InvalidHeaderValue {
            name: name.to_string(),
            value: value.to_string(),
        })?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Write the final body and terminate the response
    pub fn end(&mut self, body: impl Into<String>) {
        if self.is_ended() {
            tracing::warn!("Response already ended, dropping second body");
            return;
        }
        self.body = Some(body.into());
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.unwrap_or_default()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
