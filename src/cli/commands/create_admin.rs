//! Create-admin command implementation
//!
//! Bootstraps the first system administrator, since the web registration
//! flow never hands out the admin role.

use super::{connect_or_report, load_or_report, EXIT_CONFIG, EXIT_FATAL};
use crate::domain::ShasthoError;
use crate::services::Services;
use clap::Args;

/// Arguments for the create-admin command
#[derive(Args, Debug)]
pub struct CreateAdminArgs {
    /// Login email for the administrator
    #[arg(long)]
    pub username: String,

    /// Password; read from SHASTHO_ADMIN_PASSWORD when omitted
    #[arg(long, env = "SHASTHO_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, default_value = "System Administrator")]
    pub full_name: String,
}

impl CreateAdminArgs {
    /// Execute the create-admin command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(password) = self.password.as_deref() else {
            println!("❌ No password given");
            println!("   Pass --password or set SHASTHO_ADMIN_PASSWORD");
            return Ok(EXIT_CONFIG);
        };

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let db = match connect_or_report(&config).await {
            Ok(db) => db,
            Err(code) => return Ok(code),
        };
        if db.backend_name() == "memory" {
            println!("⚠️  storage = \"memory\": the account disappears when this command exits");
        }

        let services = Services::new(db, &config.security);
        match services
            .auth
            .create_admin(&self.username, password, &self.full_name)
            .await
        {
            Ok(user) => {
                println!("✅ Administrator created: {} ({})", user.username, user.id);
                Ok(0)
            }
            Err(ShasthoError::Validation(errors)) => {
                println!("❌ Invalid administrator details");
                for field in errors.errors() {
                    println!("   {}: {}", field.field, field.message);
                }
                Ok(EXIT_CONFIG)
            }
            Err(e) => {
                tracing::error!(username = %self.username, error = %e, "Failed to create administrator");
                println!("❌ Failed to create administrator");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}
