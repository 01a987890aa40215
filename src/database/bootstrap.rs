use crate::config::DatabaseConfig;
use crate::database::connection::{self, Connection, DatabaseError};
use crate::schema::SchemaRegistry;

/// Zero-argument entry point: carries the configuration and the registry so
/// callers can simply `connect()`.
#[derive(Debug)]
pub struct Bootstrap {
    config: DatabaseConfig,
    registry: SchemaRegistry,
}

impl Bootstrap {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            registry: SchemaRegistry::new(),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Open a fresh connection; the `User` schema is registered at most once
    pub async fn connect(&self) -> Result<Connection, DatabaseError> {
        connection::connect(&self.config, &self.registry).await
    }
}
