//! Error types for LoginBridge core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Store document could not be (de)serialized.
    #[error("store format error: {0}")]
    Json(#[from] serde_json::Error),

    /// No database is open.
    #[error("no database open")]
    DatabaseClosed,

    /// No entry has the given id.
    #[error("entry not found: {unique_id}")]
    EntryNotFound {
        /// The id that was looked up.
        unique_id: String,
    },

    /// The id is not 32 hex digits.
    #[error("invalid unique id: {value:?}")]
    InvalidUniqueId {
        /// The rejected text.
        value: String,
    },

    /// An entry with this id already exists.
    #[error("duplicate entry: {unique_id}")]
    DuplicateEntry {
        /// The clashing id.
        unique_id: String,
    },

    /// A URL search pattern failed to compile.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex_lite::Error),

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an entry not found error.
    pub fn entry_not_found(unique_id: impl Into<String>) -> Self {
        Self::EntryNotFound {
            unique_id: unique_id.into(),
        }
    }

    /// Creates an invalid unique id error.
    pub fn invalid_unique_id(value: impl Into<String>) -> Self {
        Self::InvalidUniqueId {
            value: value.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the caller supplied bad input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            CoreError::EntryNotFound { .. } | CoreError::InvalidUniqueId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(CoreError::entry_not_found("ab").is_caller_error());
        assert!(CoreError::invalid_unique_id("zz").is_caller_error());
        assert!(!CoreError::DatabaseClosed.is_caller_error());
    }

    #[test]
    fn display() {
        assert_eq!(CoreError::DatabaseClosed.to_string(), "no database open");
        assert!(CoreError::entry_not_found("00ff").to_string().contains("00ff"));
    }
}
