//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Shastho using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Shastho - Healthcare Records Service
#[derive(Parser, Debug)]
#[command(name = "shastho")]
#[command(version, about, long_about = None)]
#[command(author = "Shastho Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "shastho.toml", env = "SHASTHO_CONFIG", global = true)]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SHASTHO_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server
    Serve(commands::serve::ServeArgs),

    /// Apply the bundled database schema
    Migrate(commands::migrate::MigrateArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Create an active system administrator account
    CreateAdmin(commands::create_admin::CreateAdminArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["shastho", "serve"]);
        assert_eq!(cli.config, "shastho.toml");
        match cli.command {
            Commands::Serve(args) => assert!(!args.migrate),
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_migrate() {
        let cli = Cli::parse_from(["shastho", "serve", "--migrate"]);
        assert!(matches!(cli.command, Commands::Serve(ref a) if a.migrate));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["shastho", "--config", "custom.toml", "migrate"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Migrate(_)));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["shastho", "validate-config", "--log-level", "debug"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["shastho", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref a) if a.force));
    }

    #[test]
    fn test_cli_parse_create_admin() {
        let cli = Cli::parse_from([
            "shastho",
            "create-admin",
            "--username",
            "root@example.com",
            "--password",
            "Secret#123",
        ]);
        match cli.command {
            Commands::CreateAdmin(args) => {
                assert_eq!(args.username, "root@example.com");
                assert_eq!(args.password.as_deref(), Some("Secret#123"));
            }
            other => panic!("expected create-admin, got {other:?}"),
        }
    }
}
