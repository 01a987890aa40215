pub mod cli;
pub mod config;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod schema;
pub mod server;

/// Install the fmt subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
