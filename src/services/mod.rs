//! Application services
//!
//! Each service owns an `Arc<dyn DatabaseClient>` and implements one slice of
//! the business rules. [`Services`] bundles them for the web layer and the CLI.
//!
//! ```rust
//! use shastho::adapters::memory::MemoryStore;
//! use shastho::config::SecurityConfig;
//! use shastho::services::Services;
//! use std::sync::Arc;
//!
//! let services = Services::new(Arc::new(MemoryStore::new()), &SecurityConfig::default());
//! # let _ = services;
//! ```

pub mod approvals;
pub mod auth;
pub mod booking;
pub mod credentials;
pub mod directory;
pub mod ehr;

pub use approvals::ApprovalService;
pub use auth::{require_role, AuthService, AuthenticatedUser, LoginOutcome};
pub use booking::{BookingService, OpenSlot};
pub use directory::{DirectoryService, DoctorProfile, Page};
pub use ehr::{Authorship, EhrService, MedicalSummary, SortDir, VisitDetails};

use crate::adapters::database::DatabaseClient;
use crate::config::SecurityConfig;
use std::sync::Arc;

pub struct Services {
    pub db: Arc<dyn DatabaseClient>,
    pub auth: AuthService,
    pub directory: DirectoryService,
    pub ehr: EhrService,
    pub booking: BookingService,
    pub approvals: ApprovalService,
}

impl Services {
    pub fn new(db: Arc<dyn DatabaseClient>, security: &SecurityConfig) -> Self {
        Self {
            auth: AuthService::new(db.clone(), security),
            directory: DirectoryService::new(db.clone()),
            ehr: EhrService::new(db.clone()),
            booking: BookingService::new(db.clone()),
            approvals: ApprovalService::new(db.clone()),
            db,
        }
    }

    /// Lowers the password hashing work factor; only for tests
    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.auth = self.auth.with_hash_iterations(iterations);
        self
    }
}
