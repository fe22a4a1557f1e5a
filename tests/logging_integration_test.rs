//! Integration tests for logging functionality
//!
//! A process can install only one global subscriber, so the file-logging
//! case lives in a single test.

use shastho::config::{load_config_from_str, LoggingConfig};
use shastho::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "/var/log/shastho");
}

#[test]
fn test_logging_section_from_toml() {
    let config = load_config_from_str(
        r#"
storage = "memory"

[logging]
local_enabled = true
local_path = "/tmp/shastho-logs"
local_rotation = "hourly"
"#,
    )
    .unwrap();

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_unknown_rotation_rejected() {
    let result = load_config_from_str(
        r#"
storage = "memory"

[logging]
local_rotation = "weekly"
"#,
    );
    let message = result.unwrap_err().to_string();
    assert!(message.contains("local_rotation"));
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("nested").join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(test = "file_logging", "written to the rolling file");
    drop(guard);

    assert!(log_path.is_dir());
    let written: Vec<_> = std::fs::read_dir(&log_path).unwrap().collect();
    assert!(!written.is_empty());
}
