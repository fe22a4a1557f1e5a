//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Environment, ShasthoConfig, StorageBackend};
use super::secret_string;
use crate::domain::errors::ShasthoError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var placeholder pattern")
});

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`ShasthoConfig`]
/// 4. Applies environment variable overrides (`SHASTHO_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ShasthoError::Configuration`] if the file cannot be read, a
/// referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use shastho::config::load_config;
///
/// let config = load_config("shastho.toml").expect("Failed to load config");
/// println!("listening on {}", config.server.bind_address());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ShasthoConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ShasthoError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ShasthoError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`] for an in-memory document
pub fn load_config_from_str(contents: &str) -> Result<ShasthoConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ShasthoConfig = toml::from_str(&contents)
        .map_err(|e| ShasthoError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ShasthoError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched. Every unset variable is reported in a
/// single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = ENV_VAR_PATTERN.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ShasthoError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ShasthoError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using the `SHASTHO_<SECTION>_<KEY>` pattern
fn apply_env_overrides(config: &mut ShasthoConfig) -> Result<()> {
    if let Ok(val) = std::env::var("SHASTHO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SHASTHO_APPLICATION_NAME") {
        config.application.name = val;
    }

    if let Ok(val) = std::env::var("SHASTHO_ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(ShasthoError::Configuration(format!(
                    "Invalid SHASTHO_ENVIRONMENT '{other}'. Must be one of: development, staging, production"
                )))
            }
        };
    }

    if let Ok(val) = std::env::var("SHASTHO_SERVER_HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("SHASTHO_SERVER_PORT") {
        config.server.port = parse_override("SHASTHO_SERVER_PORT", &val)?;
    }

    if let Ok(val) = std::env::var("SHASTHO_SECURITY_SECRET_KEY") {
        config.security.secret_key = secret_string(val);
    }
    if let Ok(val) = std::env::var("SHASTHO_SECURITY_SESSION_LIFETIME_HOURS") {
        config.security.session_lifetime_hours =
            parse_override("SHASTHO_SECURITY_SESSION_LIFETIME_HOURS", &val)?;
    }

    if let Ok(val) = std::env::var("SHASTHO_STORAGE") {
        config.storage = match val.to_lowercase().as_str() {
            "postgresql" => StorageBackend::PostgreSQL,
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ShasthoError::Configuration(format!(
                    "Invalid SHASTHO_STORAGE '{other}'. Must be one of: postgresql, memory"
                )))
            }
        };
    }

    // PostgreSQL overrides (only if the section is present)
    if let Some(ref mut pg) = config.postgresql {
        if let Ok(val) = std::env::var("SHASTHO_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("SHASTHO_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_override("SHASTHO_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Ok(val) = std::env::var("SHASTHO_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    if let Ok(val) = std::env::var("SHASTHO_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("SHASTHO_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
