//! Cross-cutting error types.
//!
//! Errors raised by entity definitions themselves. Registry and store errors
//! live in their own crates and wrap these where needed.

use thiserror::Error;

/// Errors that can be raised while building or mutating an entity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Entity or sub-document lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (shape, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A string could not be parsed as an object identifier.
    #[error("Invalid object id '{0}': expected 24 hex characters")]
    InvalidId(String),

    /// A collection name did not match any entity kind.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}
