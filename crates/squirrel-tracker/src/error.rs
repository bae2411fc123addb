//! Error types for squirrel-tracker.
//!
//! This module defines all error types used throughout the squirrel-tracker
//! crate, providing detailed context for debugging and user-friendly error
//! messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::sighting::SightingId;
use crate::validation::ValidationErrors;

/// The main error type for squirrel-tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Record Lifecycle Errors ===
    /// The record list could not be loaded from the store.
    #[error("Failed to load squirrels: {reason}")]
    LoadFailure {
        /// Why the load failed.
        reason: String,
    },

    /// A create or update call was not accepted by the store.
    #[error("Failed to save squirrel: {reason}")]
    SaveFailure {
        /// Why the save failed.
        reason: String,
    },

    /// The favorite flag could not be updated.
    #[error("Failed to update favorite status: {reason}")]
    ToggleFailure {
        /// Why the update failed.
        reason: String,
    },

    /// Required form fields are missing.
    #[error("invalid sighting: {0}")]
    Validation(ValidationErrors),

    /// A form action was attempted with no form open.
    #[error("no add or edit form is open")]
    FormClosed,

    /// No sighting with this id is in the current list.
    #[error("no sighting with id {id}")]
    NotFound {
        /// The id that was looked up.
        id: SightingId,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for squirrel-tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a load failure.
    #[must_use]
    pub fn load_failure(reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            reason: reason.into(),
        }
    }

    /// Create a save failure.
    #[must_use]
    pub fn save_failure(reason: impl Into<String>) -> Self {
        Self::SaveFailure {
            reason: reason.into(),
        }
    }

    /// Create a favorite toggle failure.
    #[must_use]
    pub fn toggle_failure(reason: impl Into<String>) -> Self {
        Self::ToggleFailure {
            reason: reason.into(),
        }
    }

    /// Check if this error is one of the transient store failures
    /// (load, save or toggle).
    #[must_use]
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::LoadFailure { .. } | Self::SaveFailure { .. } | Self::ToggleFailure { .. }
        )
    }

    /// Field errors, if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Field, FormValues};

    #[test]
    fn test_error_display() {
        let err = Error::FormClosed;
        assert_eq!(err.to_string(), "no add or edit form is open");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_lifecycle_failures_display() {
        let err = Error::load_failure("store rejected the request");
        assert_eq!(
            err.to_string(),
            "Failed to load squirrels: store rejected the request"
        );

        let err = Error::save_failure("disk full");
        assert!(err.to_string().starts_with("Failed to save squirrel"));

        let err = Error::toggle_failure("timeout");
        assert!(err.to_string().starts_with("Failed to update favorite status"));
    }

    #[test]
    fn test_is_store_failure() {
        assert!(Error::load_failure("x").is_store_failure());
        assert!(Error::save_failure("x").is_store_failure());
        assert!(Error::toggle_failure("x").is_store_failure());
        assert!(!Error::FormClosed.is_store_failure());
    }

    #[test]
    fn test_validation_error_conversion() {
        let errors = FormValues::default().validate().unwrap_err();
        let err: Error = errors.into();
        assert!(!err.is_store_failure());
        let fields = err.validation_errors().unwrap();
        assert!(fields.has(Field::Species));
        assert!(err.to_string().starts_with("invalid sighting"));
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            id: SightingId::new(9),
        };
        assert_eq!(err.to_string(), "no sighting with id 9");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        // Create a rusqlite error by trying to open a non-existent DB in read-only mode
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "page_size must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
