//! Schema validation error types.

use thiserror::Error;

/// Errors from the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested collection has no registered schema.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// Document failed validation. Every constraint violation (missing
    /// required field, enum mismatch, pattern, length, shape) lands here.
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// Individual error messages, in detection order.
        errors: Vec<String>,
    },

    /// Schema compilation or document re-serialization error.
    #[error("Schema generation error: {0}")]
    Generation(String),
}

impl SchemaError {
    /// Single-message validation failure.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            errors: vec![message.into()],
        }
    }
}
