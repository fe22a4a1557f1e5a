//! Configuration management for Shastho.
//!
//! Shastho reads a single TOML file (default `shastho.toml`) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SHASTHO_<SECTION>_<KEY>` overrides applied after parsing
//! - Default values for every optional setting
//! - Validation before anything else starts
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//! storage = "postgresql"
//!
//! [application]
//! name = "Shastho"
//! log_level = "info"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [security]
//! secret_key = "${SHASTHO_SECRET_KEY}"
//! session_lifetime_hours = 24
//!
//! [postgresql]
//! connection_string = "${DATABASE_URL}"
//! max_connections = 10
//! ssl_mode = "require"
//!
//! [logging]
//! local_enabled = true
//! local_path = "/var/log/shastho"
//! local_rotation = "daily"
//! ```
//!
//! ```rust,no_run
//! use shastho::config::load_config;
//!
//! # fn example() {
//! match load_config("shastho.toml") {
//!     Ok(config) => println!("Serving {} on {}", config.application.name, config.server.bind_address()),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, Environment, LoggingConfig, PostgreSQLConfig, SecurityConfig, ServerConfig,
    ShasthoConfig, StorageBackend,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
