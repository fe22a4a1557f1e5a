//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX` so they do not
//! interfere with each other.

use secrecy::ExposeSecret;
use shastho::config::{load_config, load_config_from_str, Environment, StorageBackend};
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("SHASTHO_APPLICATION_LOG_LEVEL");
    std::env::remove_var("SHASTHO_ENVIRONMENT");
    std::env::remove_var("SHASTHO_SERVER_PORT");
    std::env::remove_var("SHASTHO_STORAGE");
    std::env::remove_var("SHASTHO_POSTGRESQL_MAX_CONNECTIONS");
    std::env::remove_var("TEST_SHASTHO_DB_URL");
    std::env::remove_var("TEST_SHASTHO_SECRET");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
environment = "staging"
storage = "postgresql"

[application]
name = "Shastho Clinic"
log_level = "debug"

[server]
host = "0.0.0.0"
port = 8080
shutdown_timeout_secs = 10

[security]
secret_key = "a-long-and-random-secret"
session_lifetime_hours = 12
reset_token_lifetime_hours = 2
password_min_length = 10

[postgresql]
connection_string = "postgresql://clinic:pw@localhost:5432/shastho"
max_connections = 20
ssl_mode = "require"

[logging]
local_enabled = false
local_path = "/tmp/shastho"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.storage, StorageBackend::PostgreSQL);
    assert_eq!(config.application.name, "Shastho Clinic");
    assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
    assert_eq!(config.server.shutdown_timeout_secs, 10);
    assert_eq!(config.security.session_lifetime_hours, 12);
    assert_eq!(config.security.password_min_length, 10);

    let pg = config.postgresql.unwrap();
    assert_eq!(pg.max_connections, 20);
    assert!(pg.requires_tls());
}

#[test]
fn test_defaults_fill_missing_sections() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config = load_config_from_str("storage = \"memory\"").unwrap();
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.application.name, "Shastho");
    assert_eq!(config.server.bind_address(), "127.0.0.1:5000");
    assert_eq!(config.security.session_lifetime_hours, 24);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var(
        "TEST_SHASTHO_DB_URL",
        "postgresql://clinic:from-env@db:5432/shastho",
    );
    std::env::set_var("TEST_SHASTHO_SECRET", "substituted-secret");

    let config = load_config_from_str(
        r#"
[security]
secret_key = "${TEST_SHASTHO_SECRET}"

[postgresql]
connection_string = "${TEST_SHASTHO_DB_URL}"
"#,
    )
    .unwrap();

    assert_eq!(
        config.security.secret_key.expose_secret().as_str(),
        "substituted-secret"
    );
    assert!(config
        .postgresql
        .unwrap()
        .connection_string
        .expose_secret()
        .as_str()
        .contains("from-env"));
    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let err = load_config_from_str(
        r#"
[postgresql]
connection_string = "${TEST_SHASTHO_DB_URL}"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("TEST_SHASTHO_DB_URL"));
}

#[test]
fn test_env_overrides_apply_after_parsing() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("SHASTHO_SERVER_PORT", "9090");
    std::env::set_var("SHASTHO_APPLICATION_LOG_LEVEL", "warn");

    let config = load_config_from_str("storage = \"memory\"").unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.application.log_level, "warn");
    cleanup_env_vars();
}

#[test]
fn test_unparseable_override_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("SHASTHO_SERVER_PORT", "eighty");

    let err = load_config_from_str("storage = \"memory\"").unwrap_err();
    assert!(err.to_string().contains("SHASTHO_SERVER_PORT"));
    cleanup_env_vars();
}

#[test]
fn test_production_rejects_default_secret_and_memory_storage() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let err = load_config_from_str(
        r#"
environment = "production"

[postgresql]
connection_string = "postgresql://clinic:pw@localhost/shastho"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("secret_key"));

    let err = load_config_from_str(
        r#"
environment = "production"
storage = "memory"

[security]
secret_key = "a-long-and-random-secret"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("memory"));
}

#[test]
fn test_postgresql_section_required() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let err = load_config_from_str("storage = \"postgresql\"").unwrap_err();
    assert!(err.to_string().contains("postgresql configuration is required"));
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/shastho.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
