//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Shastho configuration file.

use super::load_or_report;
use crate::adapters::postgresql::client::redact_connection_string;
use crate::config::{ShasthoConfig, StorageBackend};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates as well
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("✅ Configuration is valid");
        println!();
        for line in summary(&config) {
            println!("  {line}");
        }
        println!();
        Ok(0)
    }
}

/// Human-readable summary with secrets redacted
fn summary(config: &ShasthoConfig) -> Vec<String> {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("Application: {}", config.application.name),
        format!("Version: {}", config.application.version),
        format!("Environment: {:?}", config.environment),
        format!("Log Level: {}", config.application.log_level),
        format!("Listen Address: {}", config.server.bind_address()),
        format!(
            "Session Lifetime: {}h",
            config.security.session_lifetime_hours
        ),
    ];

    match config.storage {
        StorageBackend::PostgreSQL => {
            lines.push("Storage: PostgreSQL".to_string());
            if let Some(ref pg) = config.postgresql {
                lines.push(format!(
                    "PostgreSQL Connection: {}",
                    redact_connection_string(pg.connection_string.expose_secret().as_str())
                ));
                lines.push(format!("Max Connections: {}", pg.max_connections));
                lines.push(format!("SSL Mode: {}", pg.ssl_mode));
            }
        }
        StorageBackend::Memory => lines.push("Storage: in-memory".to_string()),
    }

    if config.logging.local_enabled {
        lines.push(format!(
            "File Logging: {} ({})",
            config.logging.local_path, config.logging.local_rotation
        ));
    }

    lines
}
