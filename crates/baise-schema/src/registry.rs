//! Central schema registry for all BAISE collections.
//!
//! The `SchemaRegistry` builds one JSON Schema per collection from the
//! baise-core entity types at construction time using
//! [`schemars::schema_for!`], merges in each entity's field constraints, and
//! provides validation via `jsonschema` and normalization through the typed
//! entity.

use std::collections::HashMap;
use std::sync::OnceLock;

use baise_core::entities::{
    Annotator, AnnotatorProject, Batch, Customer, DataResource, Payment, PersonnelPayout,
    Project, QaTester, QaTesterProject, Questionnaire, QuestionnaireQuestions,
    QuestionnaireResult, ResumeMetadata, Task, TrainingMaterials,
};
use baise_core::enums::EntityKind;
use baise_core::{Entity, FieldConstraint, FieldRule, ObjectId};
use schemars::schema_for;
use serde_json::Value;

use crate::error::SchemaError;
use crate::invariants;

/// Properties whose schema default is generated per document and therefore
/// meaningless in an exported schema.
const GENERATED_FIELDS: [&str; 3] = ["_id", "creationTimestamp", "updatedTimestamp"];

type NormalizeFn = fn(Value) -> Result<Value, SchemaError>;
type ReferencesFn = fn(&Value) -> Result<Vec<(EntityKind, ObjectId)>, SchemaError>;

struct Registered {
    kind: EntityKind,
    schema: Value,
    constraints: &'static [FieldConstraint],
    normalize: NormalizeFn,
    references: ReferencesFn,
}

/// Central store of all collection schemas.
///
/// Immutable once built; share the process-wide instance from
/// [`SchemaRegistry::global`].
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Registered>,
}

/// Register entity type `$ty` under its collection name.
macro_rules! register {
    ($map:expr, $ty:ty) => {{
        let kind = <$ty as Entity>::KIND;
        let constraints = <$ty as Entity>::CONSTRAINTS;
        let mut schema = schema_for!($ty).to_value();
        apply_constraints(&mut schema, constraints);
        strip_generated_defaults(&mut schema);
        $map.insert(
            kind.collection(),
            Registered {
                kind,
                schema,
                constraints,
                normalize: normalize_as::<$ty>,
                references: references_of::<$ty>,
            },
        );
    }};
}

impl SchemaRegistry {
    /// Build a new registry containing one schema per collection.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas: HashMap<&'static str, Registered> = HashMap::new();

        register!(schemas, DataResource);
        register!(schemas, Project);
        register!(schemas, TrainingMaterials);
        register!(schemas, Questionnaire);
        register!(schemas, QuestionnaireQuestions);
        register!(schemas, QuestionnaireResult);
        register!(schemas, QaTester);
        register!(schemas, Annotator);
        register!(schemas, ResumeMetadata);
        register!(schemas, Customer);
        register!(schemas, QaTesterProject);
        register!(schemas, AnnotatorProject);
        register!(schemas, Task);
        register!(schemas, Batch);
        register!(schemas, Payment);
        register!(schemas, PersonnelPayout);

        tracing::debug!(count = schemas.len(), "schema registry built");
        Self { schemas }
    }

    /// The process-wide registry, built on first use.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::new)
    }

    /// Get a collection's schema. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, collection: &str) -> Option<&Value> {
        self.schemas.get(collection).map(|r| &r.schema)
    }

    /// Entity kind stored in `collection`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for an unregistered collection.
    pub fn kind(&self, collection: &str) -> Result<EntityKind, SchemaError> {
        self.entry(collection).map(|r| r.kind)
    }

    /// Field constraints registered for `collection`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for an unregistered collection.
    pub fn constraints(&self, collection: &str) -> Result<&'static [FieldConstraint], SchemaError> {
        self.entry(collection).map(|r| r.constraints)
    }

    /// Fields whose values must be unique across `collection`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for an unregistered collection.
    pub fn unique_fields(&self, collection: &str) -> Result<Vec<&'static str>, SchemaError> {
        Ok(self
            .constraints(collection)?
            .iter()
            .filter(|c| c.rule == FieldRule::Unique)
            .map(|c| c.field)
            .collect())
    }

    /// Validate a raw document against a collection's schema and raw
    /// cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the collection is unknown, or
    /// `SchemaError::ValidationFailed` listing every violation.
    pub fn validate(&self, collection: &str, instance: &Value) -> Result<(), SchemaError> {
        let entry = self.entry(collection)?;

        let validator = jsonschema::validator_for(&entry.schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let mut errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();
        errors.extend(invariants::check(entry.kind, instance));

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(collection, errors = errors.len(), "document failed validation");
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Validate a raw document and return it with defaults populated
    /// (`_id`, timestamps, static defaults) in canonical field form.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for an unknown collection,
    /// `SchemaError::ValidationFailed` if the document or its typed form
    /// violates any rule.
    pub fn normalize(&self, collection: &str, instance: Value) -> Result<Value, SchemaError> {
        self.validate(collection, &instance)?;
        let entry = self.entry(collection)?;
        (entry.normalize)(instance)
    }

    /// Outgoing references of a normalized document as (target kind, id).
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for an unknown collection or
    /// `SchemaError::ValidationFailed` if the document does not parse.
    pub fn references(
        &self,
        collection: &str,
        instance: &Value,
    ) -> Result<Vec<(EntityKind, ObjectId)>, SchemaError> {
        (self.entry(collection)?.references)(instance)
    }

    /// List all registered collection names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    fn entry(&self, collection: &str) -> Result<&Registered, SchemaError> {
        self.schemas
            .get(collection)
            .ok_or_else(|| SchemaError::NotFound(collection.to_string()))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_as<T: Entity>(instance: Value) -> Result<Value, SchemaError> {
    let typed: T =
        serde_json::from_value(instance).map_err(|e| SchemaError::invalid(e.to_string()))?;
    typed
        .check_invariants()
        .map_err(|e| SchemaError::invalid(e.to_string()))?;
    typed
        .timestamps()
        .check()
        .map_err(|e| SchemaError::invalid(e.to_string()))?;
    serde_json::to_value(&typed).map_err(|e| SchemaError::Generation(e.to_string()))
}

fn references_of<T: Entity>(instance: &Value) -> Result<Vec<(EntityKind, ObjectId)>, SchemaError> {
    let typed = T::deserialize(instance).map_err(|e| SchemaError::invalid(e.to_string()))?;
    Ok(typed.references())
}

/// Merge `minLength` / `pattern` rules into the top-level property schemas.
fn apply_constraints(schema: &mut Value, constraints: &[FieldConstraint]) {
    let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) else {
        return;
    };
    for constraint in constraints {
        let Some(property) = properties
            .get_mut(constraint.field)
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        match constraint.rule {
            FieldRule::MinLength(min) => {
                property.insert("minLength".into(), min.into());
            }
            FieldRule::Pattern(pattern) => {
                property.insert("pattern".into(), pattern.into());
            }
            FieldRule::Unique => {}
        }
    }
}

fn strip_generated_defaults(schema: &mut Value) {
    let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) else {
        return;
    };
    for field in GENERATED_FIELDS {
        if let Some(property) = properties.get_mut(field).and_then(Value::as_object_mut) {
            property.remove("default");
        }
    }
}
