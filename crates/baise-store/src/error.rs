//! Document store error types.

use baise_core::CoreError;
use baise_schema::SchemaError;
use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write violated a schema, field, uniqueness, invariant, or
    /// reference rule.
    #[error("Validation failed for {collection}: {errors:?}")]
    Validation {
        collection: String,
        errors: Vec<String>,
    },

    /// No document with this id in the collection.
    #[error("Document not found: {collection} {id}")]
    NotFound { collection: String, id: String },

    /// A document with this `_id` already exists.
    #[error("Duplicate id in {collection}: {id}")]
    Duplicate { collection: String, id: String },

    /// Registry lookup or schema compilation failed.
    #[error(transparent)]
    Schema(SchemaError),

    /// Entity-level operation failed (e.g. an invalid state transition).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A stored document could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Single-message validation failure.
    pub(crate) fn invalid(collection: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            collection: collection.to_string(),
            errors: vec![message.into()],
        }
    }

    /// Fold a registry error into the store's uniform validation kind.
    pub(crate) fn from_schema(collection: &str, err: SchemaError) -> Self {
        match err {
            SchemaError::ValidationFailed { errors } => Self::Validation {
                collection: collection.to_string(),
                errors,
            },
            other => Self::Schema(other),
        }
    }

    /// Whether this is the uniform validation kind.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
