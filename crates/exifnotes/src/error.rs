//! Error types for exifnotes.
//!
//! This module defines all error types used throughout the exifnotes crate,
//! providing detailed context for debugging and short messages for the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for exifnotes operations.
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

    // === Domain Errors ===
    /// A record failed validation before being written.
    #[error("invalid {entity}: {message}")]
    Validation {
        /// Kind of record, e.g. "camera".
        entity: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Row id that was looked up.
        id: i64,
    },

    /// A record cannot be deleted because other records reference it.
    #[error("{entity} {id} is in use")]
    InUse {
        /// Kind of record.
        entity: &'static str,
        /// Row id of the record.
        id: i64,
    },

    /// A value is not one of the values offered for a field.
    #[error("invalid {field} '{value}' (allowed: {allowed})")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// The rejected input.
        value: String,
        /// Short rendering of the allowed values.
        allowed: String,
    },

    /// Free-form input could not be parsed into a domain value.
    #[error(transparent)]
    Parse(#[from] ParseError),

    // === Geocoding Errors ===
    /// The geocoding service answered with a non-success status.
    #[error("geocoding failed ({status}): {message}")]
    Geocoding {
        /// Status string reported by the service.
        status: String,
        /// Error message reported by the service.
        message: String,
    },

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === Picture Errors ===
    /// A complementary picture could not be decoded or encoded.
    #[error("picture error: {0}")]
    Picture(#[from] image::ImageError),

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

/// Failure to parse a user-supplied value such as "1/125" or "f/2.8".
///
/// This is the `FromStr::Err` of every domain value type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse '{input}' as {kind}")]
pub struct ParseError {
    /// What was expected, e.g. "shutter speed".
    pub kind: &'static str,
    /// The rejected input.
    pub input: String,
}

impl ParseError {
    /// Create a parse error for the given kind of value.
    #[must_use]
    pub fn new(kind: &'static str, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }
}

/// A specialized Result type for exifnotes operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for the given record kind.
    #[must_use]
    pub fn validation(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create an invalid-value error listing what would have been accepted.
    #[must_use]
    pub fn invalid_value<T: std::fmt::Display>(
        field: &'static str,
        value: impl Into<String>,
        allowed: &[T],
    ) -> Self {
        let mut rendered: Vec<String> = allowed.iter().take(8).map(ToString::to_string).collect();
        if allowed.len() > 8 {
            rendered.push(format!("... {} more", allowed.len() - 8));
        }
        Self::InvalidValue {
            field,
            value: value.into(),
            allowed: if rendered.is_empty() {
                "none".to_string()
            } else {
                rendered.join(", ")
            },
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error indicates a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a user input problem rather than a system failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidValue { .. }
                | Self::InUse { .. }
                | Self::Parse(_)
        )
    }
}
