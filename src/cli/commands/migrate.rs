//! Migrate command implementation

use super::{connect_or_report, load_or_report, EXIT_CONNECTION};
use clap::Args;

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {}

impl MigrateArgs {
    /// Execute the migrate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Applying database schema");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let db = match connect_or_report(&config).await {
            Ok(db) => db,
            Err(code) => return Ok(code),
        };

        match db.ensure_schema().await {
            Ok(()) => {
                println!("✅ Schema is up to date ({})", db.backend_name());
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Schema migration failed");
                println!("❌ Schema migration failed");
                println!("   Error: {e}");
                Ok(EXIT_CONNECTION)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_migrate_on_memory_storage() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "storage = \"memory\"").unwrap();

        let code = MigrateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
