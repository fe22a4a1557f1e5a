//! Database client factory

use crate::adapters::database::traits::DatabaseClient;
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{ShasthoConfig, StorageBackend};
use crate::domain::{Result, ShasthoError};
use std::sync::Arc;

/// Create the storage backend selected by `storage` in the configuration
///
/// # Errors
///
/// Returns an error if PostgreSQL is selected without a `[postgresql]`
/// section or the connection pool cannot be built.
pub async fn create_database_client(config: &ShasthoConfig) -> Result<Arc<dyn DatabaseClient>> {
    match config.storage {
        StorageBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                ShasthoError::Configuration(
                    "postgresql configuration is required when storage = 'postgresql'".to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL client");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            tracing::info!(database = %client.connection_string_safe(), "PostgreSQL pool ready");

            Ok(Arc::new(PostgreSQLAdapter::new(client)) as Arc<dyn DatabaseClient>)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()) as Arc<dyn DatabaseClient>)
        }
    }
}
