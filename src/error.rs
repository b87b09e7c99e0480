//! Error types for cadence
//!
//! One error enum for the whole crate, built with thiserror. Business-rule
//! rejections (missing entities, unsafe adjustments) are NOT errors — they
//! travel as data on the diff so callers can render them. Errors here are
//! I/O, serialization, validation, and programmer mistakes.

use thiserror::Error;

/// The main error type for cadence operations
#[derive(Error, Debug)]
pub enum CadenceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Validation errors raised when loading or mutating the plan
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// An unknown dotted configuration key was passed to a direct set.
    /// This is a programmer/automation error and is intentionally fatal.
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Free-text parsing errors (malformed amounts, dates)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Audit store errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Event import errors
    #[error("Import error: {0}")]
    Import(String),
}

impl CadenceError {
    /// Create a "not found" error for debts
    pub fn debt_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Debt",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for recurring items
    pub fn recurring_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Recurring item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for loops
    pub fn loop_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Loop",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for audit records
    pub fn audit_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Audit record",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for CadenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CadenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for CadenceError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Result type alias for cadence operations
pub type CadenceResult<T> = Result<T, CadenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CadenceError::Config("missing payroll".into());
        assert_eq!(err.to_string(), "Configuration error: missing payroll");
    }

    #[test]
    fn test_not_found_error() {
        let err = CadenceError::debt_not_found("Slate");
        assert_eq!(err.to_string(), "Debt not found: Slate");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unknown_key_error() {
        let err = CadenceError::UnknownKey("payroll.bogus".into());
        assert_eq!(err.to_string(), "Unknown configuration key: payroll.bogus");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CadenceError = io_err.into();
        assert!(matches!(err, CadenceError::Io(_)));
    }
}
