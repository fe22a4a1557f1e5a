//! Domain error types
//!
//! This module defines the error hierarchy for Shastho. Every fallible library
//! operation returns [`ShasthoError`]; the web layer maps each variant onto an
//! HTTP status, and the CLI maps them onto process exit codes.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main Shastho error type
#[derive(Debug, Error)]
pub enum ShasthoError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// One or more submitted fields failed validation
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record collides with an existing one (duplicate username, double booking)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credentials or session token rejected
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authenticated caller is not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation is not legal in the record's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ShasthoError {
    /// Shorthand for a single-field validation failure
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ShasthoError::Validation(ValidationErrors::single(field, message))
    }

    /// Shorthand for a missing required field
    pub fn required(field: impl Into<String>) -> Self {
        Self::invalid_field(field, "This field is required")
    }
}

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Every field check that failed for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message, None);
        errors
    }

    pub fn push(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
            value,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns the first message recorded for `field`
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Appends failures for fields not already reported
    pub fn absorb(&mut self, other: ValidationErrors) {
        for error in other.0 {
            if self.message_for(&error.field).is_none() {
                self.0.push(error);
            }
        }
    }

    /// Converts into `Err(ShasthoError::Validation)` when any check failed
    pub fn into_result(self) -> Result<(), ShasthoError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ShasthoError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<std::io::Error> for ShasthoError {
    fn from(err: std::io::Error) -> Self {
        ShasthoError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ShasthoError {
    fn from(err: serde_json::Error) -> Self {
        ShasthoError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ShasthoError {
    fn from(err: toml::de::Error) -> Self {
        ShasthoError::Configuration(format!("TOML parse error: {err}"))
    }
}
