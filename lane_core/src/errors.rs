//! # Error Types
//!
//! Structured error types for lane_core. Every failure carries enough
//! context for a front end to tell the user what to fix, and serializes to
//! tagged JSON so the CLI can print it in machine-readable form.
//!
//! The alignment calculation itself never fails: "no bowler selected" is an
//! absent result, not an error. Errors come from the roster, the roster
//! file, and the share codec.
//!
//! ## Example
//!
//! ```rust
//! use lane_core::errors::{CalcError, CalcResult};
//!
//! fn validate_name(name: &str) -> CalcResult<()> {
//!     if name.trim().is_empty() {
//!         return Err(CalcError::invalid_input("name", name, "Name must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_name("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for lane_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for roster, file and share operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid or a required field is missing
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// No bowler matches the given id, id prefix or name
    #[error("Bowler not found: {query}")]
    BowlerNotFound { query: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// A share token could not be decoded
    #[error("Share token could not be decoded: {reason}")]
    ShareDecodeError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error for a required field that is absent
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: "<missing>".to_string(),
            reason: "Required field is missing".to_string(),
        }
    }

    /// Create a BowlerNotFound error
    pub fn bowler_not_found(query: impl Into<String>) -> Self {
        CalcError::BowlerNotFound {
            query: query.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Create a ShareDecodeError
    pub fn share_decode(reason: impl Into<String>) -> Self {
        CalcError::ShareDecodeError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::BowlerNotFound { .. } => "BOWLER_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::ShareDecodeError { .. } => "SHARE_DECODE_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
