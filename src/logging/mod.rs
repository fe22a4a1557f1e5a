//! Logging and observability
//!
//! Structured logging built on `tracing`, plus a handful of macros that keep
//! the field names of recurring events consistent across the web layer and
//! the services.
//!
//! ```no_run
//! use shastho::config::LoggingConfig;
//! use shastho::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! tracing::info!(port = 5000, "Server listening");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a request that was refused before reaching a handler
///
/// ```no_run
/// use shastho::log_request_rejected;
///
/// log_request_rejected!("/admin/dashboard", "role patient not permitted");
/// ```
#[macro_export]
macro_rules! log_request_rejected {
    ($path:expr, $reason:expr) => {
        tracing::warn!(
            path = %$path,
            reason = %$reason,
            "Request rejected"
        );
    };
}

/// Log a workflow status change (approval, cancellation, …)
///
/// ```no_run
/// use shastho::log_status_transition;
/// use shastho::domain::{AdminRequestId, AdminRequestStatus};
///
/// let id = AdminRequestId::new();
/// log_status_transition!("test_image_admin_request", id, AdminRequestStatus::Pending, AdminRequestStatus::Approved);
/// ```
#[macro_export]
macro_rules! log_status_transition {
    ($entity:expr, $id:expr, $from:expr, $to:expr) => {
        tracing::info!(
            entity = $entity,
            id = %$id,
            from = %$from,
            to = %$to,
            "Status changed"
        );
    };
}

/// Log an error with context
///
/// ```no_run
/// use shastho::log_error_with_context;
/// use shastho::domain::ShasthoError;
///
/// let error = ShasthoError::Database("connection refused".to_string());
/// log_error_with_context!(&error, "Failed to load appointments");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
