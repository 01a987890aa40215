use async_trait::async_trait;
use axum::http::request::Parts;

use crate::dispatch::{DispatchError, Middleware, Next, ResponseWriter};

// Served byte-for-byte as the legacy server did, typos included.
pub const HELLO_BODY: &str = "Hello World";
pub const GOODBYE_HEADER: &str = "Context-Type";
pub const GOODBYE_HEADER_VALUE: &str = "text/plan";
pub const GOODBYE_BODY: &str = "Goobye World!";

/// Terminal middleware: sets one header and ends with a fixed body
#[derive(Debug, Clone)]
pub struct FixedResponse {
    name: &'static str,
    header: &'static str,
    header_value: &'static str,
    body: &'static str,
}

impl FixedResponse {
    pub const fn new(
        name: &'static str,
        header: &'static str,
        header_value: &'static str,
        body: &'static str,
    ) -> Self {
        Self {
            name,
            header,
            header_value,
            body,
        }
    }

    pub const fn hello() -> Self {
        Self::new("hello_world", "Content-Type", "text/plain", HELLO_BODY)
    }

    pub const fn goodbye() -> Self {
        Self::new("goodbye_world", GOODBYE_HEADER, GOODBYE_HEADER_VALUE, GOODBYE_BODY)
    }
}

#[async_trait]
impl Middleware for FixedResponse {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(
        &self,
        _request: &Parts,
        response: &mut ResponseWriter,
        _next: Next<'_>,
    ) -> Result<(), DispatchError> {
        response.set_header(self.header, self.header_value)?;
        response.end(self.body);
        Ok(())
    }
}
