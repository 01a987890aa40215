use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::dispatch::{DispatchError, Middleware, Next, ResponseWriter};

/// Destination for request log lines. Must tolerate concurrent writers.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Emits each line as an INFO event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::info!(target: "greeter_api::access", "{}", line);
    }
}

/// Keeps lines in memory, in write order
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Writes `<METHOD> <path>` and always continues the chain
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        "request_logger"
    }

    async fn handle(
        &self,
        request: &Parts,
        response: &mut ResponseWriter,
        next: Next<'_>,
    ) -> Result<(), DispatchError> {
        self.sink.write_line(&format!("{} {}", request.method, request.uri.path()));
        next.run(request, response).await
    }
}
