//! Built-in middleware and the default chain served on the HTTP port.
//!
//! Registration order matters: the logger sees every request first, then the
//! fixed responders terminate their own prefixes.

pub mod greeting;
pub mod logger;

pub use greeting::FixedResponse;
pub use logger::{LogSink, RequestLogger, TracingSink};

use std::sync::Arc;

use crate::dispatch::{DispatchOptions, Dispatcher};

pub const HELLO_PREFIX: &str = "/hello";
pub const GOODBYE_PREFIX: &str = "/goodbye";

/// Logger for every path, then `/hello`, then `/goodbye`
pub fn default_chain(sink: Arc<dyn LogSink>, options: DispatchOptions) -> Dispatcher {
    Dispatcher::builder()
        .options(options)
        .register_any(RequestLogger::new(sink))
        .register(HELLO_PREFIX, FixedResponse::hello())
        .register(GOODBYE_PREFIX, FixedResponse::goodbye())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::logger::MemorySink;
    use axum::http::{Request, StatusCode};

    fn parts(uri: &str) -> axum::http::request::Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn default_chain_serves_both_greetings() {
        let sink = Arc::new(MemorySink::default());
        let dispatcher = default_chain(sink.clone(), DispatchOptions::default());

        let hello = dispatcher.dispatch(&parts("/hello")).await.unwrap();
        assert_eq!(hello.body(), Some("Hello World"));

        let goodbye = dispatcher.dispatch(&parts("/goodbye/now")).await.unwrap();
        assert_eq!(goodbye.body(), Some("Goobye World!"));

        let missing = dispatcher.dispatch(&parts("/elsewhere")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            sink.lines(),
            vec!["GET /hello", "GET /goodbye/now", "GET /elsewhere"]
        );
    }
}
