//! Cross-cutting error types for audited.
//!
//! Domain-specific errors (e.g., `DatabaseError`, `ConfigError`) are defined
//! in their respective crates.

use thiserror::Error;

/// Errors that can be raised by any audited crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A context value could not be converted to JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reasons a `Principal` could not be resolved from a `WriteContext`.
///
/// None of these abort a write: the stamping hooks treat every variant as
/// "no principal available" and leave the audit columns alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    /// The context holds no value under the current-user key.
    #[error("no current user under context key '{key}'")]
    Missing { key: String },

    /// The identifier field is not a UUID.
    #[error("invalid principal id '{value}': {reason}")]
    InvalidId { value: String, reason: String },

    /// The role field is not a 64-bit integer.
    #[error("invalid principal role '{value}': {reason}")]
    InvalidRole { value: String, reason: String },
}
