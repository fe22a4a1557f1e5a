//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "shastho.toml")]
    pub output: String,

    /// Include comments explaining every setting
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Shastho configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set SHASTHO_SECRET_KEY");
                println!("     - Set DATABASE_URL to your PostgreSQL connection string");
                println!("  3. Validate configuration: shastho validate-config");
                println!("  4. Apply the schema: shastho migrate");
                println!("  5. Bootstrap an administrator: shastho create-admin --username you@example.com");
                println!("  6. Start the server: shastho serve");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Shastho Configuration File

environment = "development"  # development | staging | production
storage = "postgresql"       # postgresql | memory

[application]
name = "Shastho"
log_level = "info"

[server]
host = "127.0.0.1"
port = 5000
shutdown_timeout_secs = 30

[security]
secret_key = "${SHASTHO_SECRET_KEY}"
session_lifetime_hours = 24
reset_token_lifetime_hours = 24
password_min_length = 8

[postgresql]
connection_string = "${DATABASE_URL}"
max_connections = 10
connection_timeout_seconds = 30
statement_timeout_seconds = 60
ssl_mode = "prefer"

[logging]
local_enabled = false
local_path = "/var/log/shastho"
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Shastho Configuration File
#
# Values of the form ${NAME} are read from the environment (or a .env file).
# Any setting can also be overridden with SHASTHO_<SECTION>_<KEY>, for
# example SHASTHO_SERVER_PORT=8080.

# Runtime environment: development | staging | production
# Production refuses the default secret key and in-memory storage.
environment = "development"

# Storage backend: postgresql | memory
# The in-memory store loses all data on exit.
storage = "postgresql"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Display name used in page titles and the navbar
name = "Shastho"

# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# HTTP Server
# ============================================================================
[server]
host = "127.0.0.1"
port = 5000

# Seconds to wait for in-flight requests after Ctrl+C / SIGTERM
shutdown_timeout_secs = 30

# ============================================================================
# Security
# ============================================================================
[security]
# Application secret (use an environment variable)
secret_key = "${SHASTHO_SECRET_KEY}"

# Login session lifetime in hours (1-720)
session_lifetime_hours = 24

# Password reset token lifetime in hours (1-168)
reset_token_lifetime_hours = 24

# Minimum password length (at least 6)
password_min_length = 8

# ============================================================================
# PostgreSQL
# ============================================================================
[postgresql]
# Format: postgresql://[user[:password]@][host][:port][/dbname]
connection_string = "${DATABASE_URL}"

# Maximum connections in pool (1-100)
max_connections = 10

# Timeout for acquiring a connection
connection_timeout_seconds = 30

# Timeout for SQL statement execution
statement_timeout_seconds = 60

# disable | allow | prefer | require | verify-ca | verify-full
ssl_mode = "prefer"

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files in addition to the console
local_enabled = false
local_path = "/var/log/shastho"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
