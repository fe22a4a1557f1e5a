//! PostgreSQL storage backend
//!
//! [`PostgreSQLClient`] owns the connection pool; [`PostgreSQLAdapter`]
//! implements the storage traits on top of it.

pub mod adapter;
pub mod client;
pub mod rows;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
