//! Storage integrations for Shastho.
//!
//! - [`database`] - storage traits and the backend factory
//! - [`postgresql`] - PostgreSQL implementation (deadpool + tokio-postgres)
//! - [`memory`] - in-process implementation for development and tests
//!
//! # Design Pattern
//!
//! Services depend on `Arc<dyn DatabaseClient>` only, so the backend is chosen
//! once at startup from the `storage` setting:
//!
//! ```rust
//! use shastho::adapters::database::DatabaseClient;
//! use shastho::adapters::memory::MemoryStore;
//! use std::sync::Arc;
//!
//! let db: Arc<dyn DatabaseClient> = Arc::new(MemoryStore::new());
//! assert_eq!(db.backend_name(), "memory");
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
