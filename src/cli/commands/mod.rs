//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod create_admin;
pub mod init;
pub mod migrate;
pub mod serve;
pub mod validate;

use crate::adapters::database::{create_database_client, DatabaseClient};
use crate::config::{load_config, ShasthoConfig};
use std::sync::Arc;

/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for storage connection errors
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code for everything else
pub const EXIT_FATAL: i32 = 5;

/// Loads the configuration, printing the failure and mapping it to an exit code
pub(crate) fn load_or_report(config_path: &str) -> Result<ShasthoConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        EXIT_CONFIG
    })
}

/// Builds the storage backend and checks that it answers
pub(crate) async fn connect_or_report(
    config: &ShasthoConfig,
) -> Result<Arc<dyn DatabaseClient>, i32> {
    let db = match create_database_client(config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create storage backend");
            println!("❌ Failed to connect to storage");
            println!("   Error: {e}");
            return Err(EXIT_CONNECTION);
        }
    };

    if let Err(e) = db.test_connection().await {
        tracing::error!(backend = db.backend_name(), error = %e, "Storage connection test failed");
        println!("❌ Storage connection test failed");
        println!("   Error: {e}");
        return Err(EXIT_CONNECTION);
    }

    Ok(db)
}
