#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use greeter_api::config::{AppConfig, DatabaseConfig};
use greeter_api::dispatch::DispatchOptions;
use greeter_api::handlers::{default_chain, logger::MemorySink};
use greeter_api::server;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub sink: Arc<MemorySink>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Start the default chain on a free port inside the current test runtime
pub async fn spawn_server(options: DispatchOptions) -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let sink = Arc::new(MemorySink::default());
    let dispatcher = Arc::new(default_chain(sink.clone(), options));

    tokio::spawn(async move {
        if let Err(e) = server::serve_on(listener, dispatcher).await {
            eprintln!("test server stopped: {e}");
        }
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        sink,
    })
}

/// Database settings from the environment (or `.env`); `None` when no
/// `DATABASE_URL` is configured, in which case DB-backed tests skip.
pub fn database_config() -> Option<DatabaseConfig> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().database;
    config.url.as_ref()?;

    Some(DatabaseConfig {
        max_connections: 2,
        connect_timeout_secs: Some(5),
        ..config
    })
}
