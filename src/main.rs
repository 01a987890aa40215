use std::sync::Arc;

use greeter_api::config::AppConfig;
use greeter_api::handlers::{default_chain, TracingSink};
use greeter_api::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PORT, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    greeter_api::init_tracing();

    let config = AppConfig::from_env();
    tracing::info!("Starting greeter in {:?} mode", config.environment);

    let dispatcher = default_chain(Arc::new(TracingSink), config.server.dispatch_options());
    server::serve(&config.server, Arc::new(dispatcher)).await
}
