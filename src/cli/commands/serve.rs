//! Serve command implementation
//!
//! Loads the configuration, connects storage and runs the axum server until
//! the shutdown signal fires.

use super::{connect_or_report, load_or_report, EXIT_CONNECTION, EXIT_FATAL};
use crate::services::Services;
use crate::web::{router, AppState};
use anyhow::Context;
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Apply the bundled schema before accepting requests
    #[arg(long)]
    pub migrate: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let db = match connect_or_report(&config).await {
            Ok(db) => db,
            Err(code) => return Ok(code),
        };

        if self.migrate {
            if let Err(e) = db.ensure_schema().await {
                tracing::error!(error = %e, "Schema migration failed");
                println!("❌ Schema migration failed: {e}");
                return Ok(EXIT_CONNECTION);
            }
        }

        let bind_address = config.server.bind_address();
        let drain_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
        let services = Arc::new(Services::new(db, &config.security));
        let state = AppState::new(services, Arc::new(config));
        let app = router(state);

        let listener = match TcpListener::bind(&bind_address).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(address = %bind_address, error = %e, "Failed to bind");
                println!("❌ Could not listen on {bind_address}: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        tracing::info!(address = %bind_address, "Server listening");
        println!("🩺 Shastho listening on http://{bind_address}");

        let mut graceful_rx = shutdown_signal.clone();
        let server = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = graceful_rx.wait_for(|stop| *stop).await;
        });

        let mut deadline_rx = shutdown_signal;
        let drain_deadline = async move {
            if deadline_rx.wait_for(|stop| *stop).await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(drain_timeout).await;
        };

        tokio::select! {
            result = server => {
                result.context("HTTP server failed")?;
                tracing::info!("Server stopped");
            }
            _ = drain_deadline => {
                tracing::warn!(
                    timeout_secs = drain_timeout.as_secs(),
                    "In-flight requests did not finish before the shutdown timeout"
                );
            }
        }

        Ok(0)
    }
}
