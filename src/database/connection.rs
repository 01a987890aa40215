use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::users::UserRepository;
use crate::schema::{SchemaDefinition, SchemaRegistry, USER_FIELDS, USER_SCHEMA, USER_TABLE};

/// Errors from connection bootstrap and queries
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Connection not established within {0:?}")]
    ConnectTimeout(Duration),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Schema column '{0}' has no User field")]
    UnmappedColumn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Live database session. Each bootstrap yields a fresh handle; the caller
/// owns it and should [`Connection::close`] it when done.
#[derive(Debug, Clone)]
pub struct Connection {
    pool: PgPool,
    endpoint: String,
    users: Arc<SchemaDefinition>,
}

impl Connection {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Repository over the table registered for `User`
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool, &self.users)
    }

    /// Endpoint with any password masked
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
        info!("Closed database connection: {}", self.endpoint);
    }
}

/// Open a connection and make sure the `User` schema is registered.
///
/// The schema is registered before the connection attempt, so it is present
/// in `registry` even when connecting fails.
pub async fn connect(config: &DatabaseConfig, registry: &SchemaRegistry) -> Result<Connection, DatabaseError> {
    let raw = config
        .url
        .as_deref()
        .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
    let url = parse_endpoint(raw)?;
    let endpoint = redact(&url);

    let schema = register_user_schema(registry);

    let mut options = PgPoolOptions::new().max_connections(config.max_connections.max(1));
    if let Some(limit) = config.connect_timeout() {
        options = options.acquire_timeout(limit);
    }
    let pending = options.connect(url.as_str());

    let pool = match config.connect_timeout() {
        Some(limit) => tokio::time::timeout(limit, pending)
            .await
            .map_err(|_| DatabaseError::ConnectTimeout(limit))?,
        None => pending.await,
    }
    .map_err(|e| DatabaseError::ConnectionError(format!("{}: {}", endpoint, e)))?;

    ensure_table(&pool, &schema).await?;

    info!("Connected to database: {}", endpoint);
    Ok(Connection {
        pool,
        endpoint,
        users: schema,
    })
}

/// Register the `User` shape; repeated calls return the same definition
pub fn register_user_schema(registry: &SchemaRegistry) -> Arc<SchemaDefinition> {
    registry.define(USER_SCHEMA, USER_TABLE, USER_FIELDS)
}

async fn ensure_table(pool: &PgPool, schema: &SchemaDefinition) -> Result<(), DatabaseError> {
    sqlx::query(&schema.create_table_sql()).execute(pool).await?;
    tracing::debug!("Ensured table {} for schema {}", schema.table(), schema.name());
    Ok(())
}

fn parse_endpoint(raw: &str) -> Result<url::Url, DatabaseError> {
    let url = url::Url::parse(raw).map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;

    match url.scheme() {
        "postgres" | "postgresql" => {}
        other => {
            return Err(DatabaseError::InvalidDatabaseUrl(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(DatabaseError::InvalidDatabaseUrl("missing host".to_string()));
    }

    Ok(url)
}

fn redact(url: &url::Url) -> String {
    let mut shown = url.clone();
    if shown.password().is_some() {
        // Only fails for cannot-be-a-base URLs, which parse_endpoint rejects
        let _ = shown.set_password(Some("****"));
    }
    shown.to_string()
}
