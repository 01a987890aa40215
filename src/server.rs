use std::sync::Arc;

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::ApiError;

/// Every request, whatever its method or path, goes through the dispatcher
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(dispatcher)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn dispatch(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request,
) -> Result<Response, ApiError> {
    let (parts, _body) = request.into_parts();
    let response = dispatcher.dispatch(&parts).await?;
    Ok(response.into_response())
}

/// Line printed once the listener is bound
pub fn startup_line(port: u16) -> String {
    format!("Server running at http://localhost:{}/", port)
}

/// Bind the configured address and serve until the process exits
pub async fn serve(config: &ServerConfig, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    serve_on(listener, dispatcher).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();

    println!("{}", startup_line(port));
    tracing::info!("Listening with {} registered middleware", dispatcher.registrations().len());

    axum::serve(listener, router(dispatcher)).await?;
    Ok(())
}
