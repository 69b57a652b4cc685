//! Error type definitions for the tile board

use thiserror::Error;

/// Top-level application error type
///
/// Validation and not-found conditions are expected and recoverable by the
/// caller. Store errors wrap the underlying `sqlx` failure as-is.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed caller input
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Underlying persistence failure
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error for a specific field
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for persistence failures, including a failed migration
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Migration(_))
    }
}
