//! Request dispatcher: registrations are walked in insertion order and each
//! matching middleware decides whether to terminate or continue.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::{request::Parts, StatusCode};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::dispatch::error::DispatchError;
use crate::dispatch::prefix::RoutePrefix;
use crate::dispatch::response::ResponseWriter;

/// A step in the handler chain.
///
/// Implementations either terminate the response by calling
/// [`ResponseWriter::end`] or pass control onward with [`Next::run`].
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        request: &Parts,
        response: &mut ResponseWriter,
        next: Next<'_>,
    ) -> Result<(), DispatchError>;
}

/// One routing rule: a literal path prefix and the middleware it guards
pub struct Registration {
    prefix: RoutePrefix,
    middleware: Arc<dyn Middleware>,
}

impl Registration {
    pub fn prefix(&self) -> &RoutePrefix {
        &self.prefix
    }

    pub fn name(&self) -> &'static str {
        self.middleware.name()
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.name())
            .finish()
    }
}

/// Continuation handed to each middleware. Running it resumes the walk at the
/// next registration whose prefix matches.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    remaining: &'a [Registration],
}

impl<'a> Next<'a> {
    pub fn run<'r>(
        self,
        request: &'r Parts,
        response: &'r mut ResponseWriter,
    ) -> BoxFuture<'r, Result<(), DispatchError>>
    where
        'a: 'r,
    {
        Box::pin(async move {
            let path = request.uri.path();
            let mut rest = self.remaining;

            while let Some((entry, tail)) = rest.split_first() {
                rest = tail;

                if !entry.prefix.matches(path) {
                    tracing::trace!(
                        "Middleware {} skipped - prefix {} doesn't match {}",
                        entry.name(), entry.prefix, path
                    );
                    continue;
                }

                tracing::debug!("Dispatching {} {} to {}", request.method, path, entry.name());
                return entry
                    .middleware
                    .handle(request, response, Next { remaining: tail })
                    .await;
            }

            Ok(())
        })
    }

    /// Number of registrations not yet considered
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

/// What to do when every matching middleware has run and none ended the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Terminate with `404 Cannot <METHOD> <path>`
    #[default]
    NotFound,
    /// Leave the response open; only a dispatch timeout ends the request
    Hang,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    pub timeout: Option<Duration>,
    pub unmatched: UnmatchedPolicy,
}

/// Frozen, ordered handler chain shared by all requests
pub struct Dispatcher {
    registrations: Vec<Registration>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Walk the chain for one request and return the terminated response
    pub async fn dispatch(&self, request: &Parts) -> Result<ResponseWriter, DispatchError> {
        let start_time = Instant::now();

        let response = match self.options.timeout {
            Some(limit) => timeout(limit, self.walk(request)).await.map_err(|_| {
                tracing::warn!(
                    "{} {} not terminated after {:?}",
                    request.method, request.uri.path(), limit
                );
                DispatchError::Timeout(limit)
            })??,
            None => self.walk(request).await?,
        };

        tracing::debug!(
            "{} {} dispatched -> {} in {:?}",
            request.method,
            request.uri.path(),
            response.status(),
            start_time.elapsed()
        );

        Ok(response)
    }

    async fn walk(&self, request: &Parts) -> Result<ResponseWriter, DispatchError> {
        let mut response = ResponseWriter::new();

        Next { remaining: &self.registrations }
            .run(request, &mut response)
            .await?;

        if !response.is_ended() {
            match self.options.unmatched {
                UnmatchedPolicy::NotFound => {
                    tracing::debug!("No middleware terminated {} {}", request.method, request.uri.path());
                    response.set_status(StatusCode::NOT_FOUND);
                    response.set_header("Content-Type", "text/plain")?;
                    response.end(format!("Cannot {} {}", request.method, request.uri.path()));
                }
                UnmatchedPolicy::Hang => {
                    tracing::warn!(
                        "{} {} left unterminated by the chain",
                        request.method, request.uri.path()
                    );
                    std::future::pending::<()>().await;
                }
            }
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registrations", &self.registrations)
            .field("options", &self.options)
            .finish()
    }
}

/// Collects registrations at startup; `build` freezes them
#[derive(Default)]
pub struct DispatcherBuilder {
    registrations: Vec<Registration>,
    options: DispatchOptions,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a middleware guarded by a path prefix
    pub fn register<M>(mut self, prefix: impl Into<RoutePrefix>, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        let prefix = prefix.into();
        tracing::debug!("Registered middleware '{}' for prefix {}", middleware.name(), prefix);
        self.registrations.push(Registration {
            prefix,
            middleware: Arc::new(middleware),
        });
        self
    }

    /// Append a middleware that sees every path
    pub fn register_any<M>(self, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.register(RoutePrefix::any(), middleware)
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            registrations: self.registrations,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    enum Action {
        Pass,
        End(&'static str),
        Fail,
    }

    struct Recording {
        label: &'static str,
        trace: Trace,
        action: Action,
    }

    #[async_trait]
    impl Middleware for Recording {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn handle(
            &self,
            request: &Parts,
            response: &mut ResponseWriter,
            next: Next<'_>,
        ) -> Result<(), DispatchError> {
            self.trace.lock().unwrap().push(self.label.to_string());
            match self.action {
                Action::Pass => next.run(request, response).await,
                Action::End(body) => {
                    response.end(body);
                    Ok(())
                }
                Action::Fail => Err(DispatchError::handler(self.label, "boom")),
            }
        }
    }

    fn recording(label: &'static str, trace: &Trace, action: Action) -> Recording {
        Recording {
            label,
            trace: trace.clone(),
            action,
        }
    }

    fn parts(method: &str, uri: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn seen(trace: &Trace) -> Vec<String> {
        trace.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn runs_matching_handlers_in_registration_order() {
        let trace = Trace::default();
        let dispatcher = Dispatcher::builder()
            .register_any(recording("first", &trace, Action::Pass))
            .register("/x", recording("second", &trace, Action::Pass))
            .register("/x", recording("third", &trace, Action::End("done")))
            .build();

        let response = dispatcher.dispatch(&parts("GET", "/x/y")).await.unwrap();

        assert_eq!(seen(&trace), vec!["first", "second", "third"]);
        assert_eq!(response.body(), Some("done"));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn terminating_handler_stops_the_chain() {
        let trace = Trace::default();
        let dispatcher = Dispatcher::builder()
            .register("/x", recording("terminal", &trace, Action::End("early")))
            .register("/x", recording("never", &trace, Action::End("late")))
            .build();

        let response = dispatcher.dispatch(&parts("GET", "/x")).await.unwrap();

        assert_eq!(seen(&trace), vec!["terminal"]);
        assert_eq!(response.body(), Some("early"));
    }

    #[tokio::test]
    async fn skips_registrations_whose_prefix_does_not_match() {
        let trace = Trace::default();
        let dispatcher = Dispatcher::builder()
            .register("/a", recording("a", &trace, Action::End("a")))
            .register("/b", recording("b", &trace, Action::End("b")))
            .build();

        let response = dispatcher.dispatch(&parts("POST", "/b?a=1")).await.unwrap();

        assert_eq!(seen(&trace), vec!["b"]);
        assert_eq!(response.body(), Some("b"));
    }

    #[tokio::test]
    async fn unterminated_request_gets_not_found_by_default() {
        let trace = Trace::default();
        let dispatcher = Dispatcher::builder()
            .register_any(recording("logger", &trace, Action::Pass))
            .register("/hello", recording("hello", &trace, Action::End("hi")))
            .build();

        let response = dispatcher.dispatch(&parts("GET", "/unmatched")).await.unwrap();

        assert_eq!(seen(&trace), vec!["logger"]);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), Some("Cannot GET /unmatched"));
        assert_eq!(response.headers().get("content-type").unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn hang_policy_only_ends_on_timeout() {
        let trace = Trace::default();
        let dispatcher = Dispatcher::builder()
            .options(DispatchOptions {
                timeout: Some(Duration::from_millis(50)),
                unmatched: UnmatchedPolicy::Hang,
            })
            .register_any(recording("logger", &trace, Action::Pass))
            .build();

        let err = dispatcher.dispatch(&parts("GET", "/unmatched")).await.unwrap_err();

        assert!(matches!(err, DispatchError::Timeout(d) if d == Duration::from_millis(50)));
        assert_eq!(seen(&trace), vec!["logger"]);
    }

    #[tokio::test]
    async fn hang_policy_without_timeout_never_completes() {
        let dispatcher = Dispatcher::builder()
            .options(DispatchOptions {
                timeout: None,
                unmatched: UnmatchedPolicy::Hang,
            })
            .build();

        let request = parts("GET", "/nothing");
        let outcome = timeout(Duration::from_millis(50), dispatcher.dispatch(&request)).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn handler_failure_stops_the_chain() {
        let trace = Trace::default();
        let dispatcher = Dispatcher::builder()
            .register_any(recording("broken", &trace, Action::Fail))
            .register_any(recording("after", &trace, Action::End("unreachable")))
            .build();

        let err = dispatcher.dispatch(&parts("GET", "/")).await.unwrap_err();

        assert!(matches!(err, DispatchError::Handler { handler: "broken", .. }));
        assert_eq!(seen(&trace), vec!["broken"]);
    }

    #[tokio::test]
    async fn concurrent_requests_get_independent_responses() {
        let trace = Trace::default();
        let dispatcher = Arc::new(
            Dispatcher::builder()
                .register("/a", recording("a", &trace, Action::End("A")))
                .register("/b", recording("b", &trace, Action::End("B")))
                .build(),
        );

        let mut tasks = Vec::new();
        for i in 0..16 {
            let dispatcher = dispatcher.clone();
            let (uri, expected) = if i % 2 == 0 { ("/a", "A") } else { ("/b", "B") };
            tasks.push(tokio::spawn(async move {
                let response = dispatcher.dispatch(&parts("GET", uri)).await.unwrap();
                assert_eq!(response.body(), Some(expected));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(seen(&trace).len(), 16);
    }

    #[test]
    fn builder_preserves_insertion_order() {
        let trace = Trace::default();
        let dispatcher = Dispatcher::builder()
            .register_any(recording("logger", &trace, Action::Pass))
            .register("/hello", recording("hello", &trace, Action::Pass))
            .register("/goodbye", recording("goodbye", &trace, Action::Pass))
            .build();

        let names: Vec<_> = dispatcher.registrations().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["logger", "hello", "goodbye"]);
        assert!(dispatcher.registrations()[0].prefix().is_any());
    }
}
