// Shastho - Healthcare Records Service
// Copyright (c) 2025 Shastho Contributors
// Licensed under the MIT License

//! # Shastho - Healthcare Records Service
//!
//! Shastho keeps patient records for a network of hospitals: accounts and
//! sessions, hospitals and departments, doctor availability and appointments,
//! and an electronic health record per patient with visits and clinical
//! sub-records.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface (`serve`, `migrate`, `create-admin`, …)
//! - [`web`] - axum router, HTML pages and the JSON API
//! - [`services`] - Business rules (auth, directory, booking, EHR, approvals)
//! - [`validation`] - Form data and per-field validation rules
//! - [`components`] - HTML fragments shared by the pages
//! - [`adapters`] - Storage backends (PostgreSQL, in-memory)
//! - [`domain`] - Identifiers, records and the error type
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shastho::config::load_config;
//! use shastho::adapters::database::create_database_client;
//! use shastho::services::Services;
//! use shastho::web::{router, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("shastho.toml")?;
//!     let db = create_database_client(&config).await?;
//!     let services = Arc::new(Services::new(db, &config.security));
//!
//!     let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
//!     let app = router(AppState::new(services, Arc::new(config)));
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::ShasthoError`]; the web layer turns each
//! variant into a status code and a JSON error body:
//!
//! ```rust
//! use shastho::domain::ShasthoError;
//!
//! let err = ShasthoError::required("username");
//! assert!(err.to_string().contains("username"));
//! ```

pub mod adapters;
pub mod cli;
pub mod components;
pub mod config;
pub mod domain;
pub mod logging;
pub mod services;
pub mod validation;
pub mod web;
