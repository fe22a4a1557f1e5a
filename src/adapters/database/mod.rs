//! Database abstraction layer
//!
//! Storage is reached through trait objects so the services run unchanged on
//! PostgreSQL in production and on the in-memory store in tests.

pub mod factory;
pub mod traits;

pub use factory::create_database_client;
pub use traits::{AccountStore, CareStore, DatabaseClient, DoctorFilter, RecordStore, VisitQuery};
