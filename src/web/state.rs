//! Shared handler state

use crate::config::{Environment, ShasthoConfig};
use crate::services::Services;
use std::sync::Arc;

/// Cloned into every handler; both halves are behind `Arc`
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub config: Arc<ShasthoConfig>,
}

impl AppState {
    pub fn new(services: Arc<Services>, config: Arc<ShasthoConfig>) -> Self {
        Self { services, config }
    }

    pub fn app_name(&self) -> &str {
        &self.config.application.name
    }

    pub fn is_production(&self) -> bool {
        self.config.environment == Environment::Production
    }

    pub fn session_max_age_secs(&self) -> i64 {
        self.config.security.session_lifetime_hours * 3600
    }
}
