//! The [`Entity`] trait binding a document type to its collection.

use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::enums::EntityKind;
use crate::errors::CoreError;
use crate::ids::ObjectId;
use crate::time::Timestamps;

/// Pattern for email fields, matched against the whole value.
pub const EMAIL_PATTERN: &str = r"^\S+@\S+\.\S+$";

/// A constraint on a top-level document field beyond its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// String must have at least this many characters.
    MinLength(u64),
    /// String must match this regular expression.
    Pattern(&'static str),
    /// No two documents in the collection may share the value.
    Unique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConstraint {
    /// Wire (camelCase) field name.
    pub field: &'static str,
    pub rule: FieldRule,
}

impl FieldConstraint {
    #[must_use]
    pub const fn new(field: &'static str, rule: FieldRule) -> Self {
        Self { field, rule }
    }
}

/// Constraints shared by every entity keyed by a unique email.
pub const UNIQUE_EMAIL: [FieldConstraint; 2] = [
    FieldConstraint::new("email", FieldRule::Pattern(EMAIL_PATTERN)),
    FieldConstraint::new("email", FieldRule::Unique),
];

/// A persisted document kind.
///
/// Implementors are plain serde structs; the schema registry derives their
/// JSON Schema and the store keys them by [`Entity::id`].
pub trait Entity: Serialize + DeserializeOwned + JsonSchema + Clone {
    const KIND: EntityKind;

    /// Field constraints not expressible in the Rust type.
    const CONSTRAINTS: &'static [FieldConstraint] = &[];

    fn id(&self) -> ObjectId;

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// Every outgoing reference as (target kind, id).
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        Vec::new()
    }

    /// Cross-field rules the type system does not capture.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` describing the first violated rule.
    fn check_invariants(&self) -> Result<(), CoreError> {
        Ok(())
    }

    /// Rules on replacing `previous` with `self`, such as state machines
    /// that only move forward.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the change is not allowed.
    fn check_transition(&self, previous: &Self) -> Result<(), CoreError> {
        let _ = previous;
        Ok(())
    }
}
