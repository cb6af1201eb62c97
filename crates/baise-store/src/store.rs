//! The in-memory document store.

use std::collections::{BTreeMap, HashMap};

use baise_config::StoreConfig;
use baise_core::entities::{
    Annotator, PersonnelProfile, PersonnelRef, QaTester, Questionnaire, QuestionnaireResult,
};
use baise_core::enums::EntityKind;
use baise_core::{Entity, EpochMillis, ObjectId, Ref, Timestamps};
use baise_schema::SchemaRegistry;
use serde_json::Value;

use crate::error::StoreError;

/// One in-memory collection per entity kind, documents keyed by `_id`.
///
/// Single owner: writes take `&mut self`. Documents are stored in their
/// normalized JSON form and deserialized on read.
pub struct DocumentStore {
    registry: &'static SchemaRegistry,
    config: StoreConfig,
    collections: HashMap<EntityKind, BTreeMap<ObjectId, Value>>,
}

/// A resolved staff member from either personnel collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Personnel {
    QaTester(QaTester),
    Annotator(Annotator),
}

impl Personnel {
    #[must_use]
    pub const fn profile(&self) -> &PersonnelProfile {
        match self {
            Self::QaTester(t) => &t.profile,
            Self::Annotator(a) => &a.profile,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ObjectId {
        match self {
            Self::QaTester(t) => t.id,
            Self::Annotator(a) => a.id,
        }
    }
}

impl DocumentStore {
    /// Empty store validating against the process-wide registry.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self::with_registry(SchemaRegistry::global(), config)
    }

    #[must_use]
    pub fn with_registry(registry: &'static SchemaRegistry, config: StoreConfig) -> Self {
        Self {
            registry,
            config,
            collections: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a typed document and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the `_id` is taken and
    /// `StoreError::Validation` for any schema, invariant, uniqueness, or
    /// reference violation.
    pub fn insert<T: Entity>(&mut self, doc: &T) -> Result<T, StoreError> {
        let value = serde_json::to_value(doc)?;
        let stored = self.insert_value(T::KIND.collection(), value)?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Normalize a raw document (generating `_id` and timestamps when
    /// absent), validate it, and insert it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::insert`], plus `StoreError::Schema` for an unknown
    /// collection.
    pub fn insert_value(&mut self, collection: &str, value: Value) -> Result<Value, StoreError> {
        self.insert_inner(collection, value)
            .inspect(|doc| tracing::debug!(collection, id = %doc["_id"], "document inserted"))
            .inspect_err(|err| reject(collection, err))
    }

    fn insert_inner(&mut self, collection: &str, value: Value) -> Result<Value, StoreError> {
        let kind = self.registry.kind(collection).map_err(StoreError::Schema)?;
        let doc = self
            .registry
            .normalize(collection, value)
            .map_err(|e| StoreError::from_schema(collection, e))?;
        let id = document_id(collection, &doc)?;

        if self.contains(kind, id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        self.check_unique(kind, id, &doc)?;
        self.check_references(collection, &doc)?;
        self.check_questionnaire_result(kind, id, &doc)?;

        self.collections
            .entry(kind)
            .or_default()
            .insert(id, doc.clone());
        Ok(doc)
    }

    /// Replace an existing document.
    ///
    /// `creationTimestamp` must match the stored value and status fields may
    /// only step forward. `updatedTimestamp` is set to now, never earlier
    /// than the stored value. The document is fully re-validated; uniqueness
    /// ignores the document itself.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no document has this id and
    /// `StoreError::Validation` for any rule violation.
    pub fn update<T: Entity>(&mut self, doc: &T) -> Result<T, StoreError> {
        let collection = T::KIND.collection();
        self.update_inner(doc)
            .inspect(|_| tracing::debug!(collection, id = %doc.id(), "document updated"))
            .inspect_err(|err| reject(collection, err))
    }

    fn update_inner<T: Entity>(&mut self, doc: &T) -> Result<T, StoreError> {
        let kind = T::KIND;
        let collection = kind.collection();
        let id = doc.id();

        let stored = self
            .collection(kind)
            .and_then(|c| c.get(&id))
            .ok_or_else(|| not_found(collection, id))?;
        let previous = T::deserialize(stored)?;
        let stored_ts: Timestamps = *previous.timestamps();

        doc.check_transition(&previous)
            .map_err(|e| StoreError::invalid(collection, e.to_string()))?;
        if doc.timestamps().creation_timestamp != stored_ts.creation_timestamp {
            return Err(StoreError::invalid(
                collection,
                format!(
                    "creationTimestamp cannot change (stored {}, got {})",
                    stored_ts.creation_timestamp.as_i64(),
                    doc.timestamps().creation_timestamp.as_i64()
                ),
            ));
        }

        let mut next = doc.clone();
        let ts = next.timestamps_mut();
        ts.updated_timestamp = ts.updated_timestamp.max(stored_ts.updated_timestamp);
        ts.touch(EpochMillis::now());

        let value = self
            .registry
            .normalize(collection, serde_json::to_value(&next)?)
            .map_err(|e| StoreError::from_schema(collection, e))?;
        self.check_unique(kind, id, &value)?;
        self.check_references(collection, &value)?;
        self.check_questionnaire_result(kind, id, &value)?;

        let updated = serde_json::from_value(value.clone())?;
        self.collections.entry(kind).or_default().insert(id, value);
        Ok(updated)
    }

    /// Grade and record a questionnaire attempt.
    ///
    /// The questionnaire's pass score decides the status; its retake limit
    /// bounds how many results one staff member may have for it. Both rules
    /// hold for every questionnaire result write, this only does the grading.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the questionnaire does not exist and
    /// `StoreError::Validation` once the retake limit is exhausted or the
    /// result itself is invalid.
    pub fn record_questionnaire_attempt(
        &mut self,
        questionnaire: Ref<Questionnaire>,
        personnel: PersonnelRef,
        personnel_email: Option<String>,
        percentage_score: f64,
    ) -> Result<QuestionnaireResult, StoreError> {
        let quiz = self
            .resolve(questionnaire)
            .inspect_err(|err| reject(EntityKind::QuestionnaireResult.collection(), err))?;
        let mut result =
            QuestionnaireResult::grade(&quiz, personnel, percentage_score, EpochMillis::now());
        result.personnel_email = personnel_email;
        self.insert(&result)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch a document by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no document has this id.
    pub fn get<T: Entity>(&self, id: ObjectId) -> Result<T, StoreError> {
        let value = self
            .collection(T::KIND)
            .and_then(|c| c.get(&id))
            .ok_or_else(|| not_found(T::KIND.collection(), id))?;
        Ok(T::deserialize(value)?)
    }

    /// Follow a typed reference.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the target does not exist.
    pub fn resolve<T: Entity>(&self, reference: Ref<T>) -> Result<T, StoreError> {
        self.get(reference.id())
    }

    /// Follow a personnel reference into whichever collection it names.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the target does not exist.
    pub fn resolve_personnel(&self, reference: PersonnelRef) -> Result<Personnel, StoreError> {
        match reference {
            PersonnelRef::QaTester(r) => self.resolve(r).map(Personnel::QaTester),
            PersonnelRef::Annotator(r) => self.resolve(r).map(Personnel::Annotator),
        }
    }

    /// All documents of a kind, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if a stored document no longer
    /// parses as `T`.
    pub fn list<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        self.collection(T::KIND)
            .into_iter()
            .flat_map(BTreeMap::values)
            .map(|v| T::deserialize(v).map_err(StoreError::from))
            .collect()
    }

    /// First document (by id) whose top-level `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the match does not parse as `T`.
    pub fn find_one<T: Entity>(&self, field: &str, value: &Value) -> Result<Option<T>, StoreError> {
        self.collection(T::KIND)
            .into_iter()
            .flat_map(BTreeMap::values)
            .find(|doc| doc.get(field) == Some(value))
            .map(|doc| T::deserialize(doc).map_err(StoreError::from))
            .transpose()
    }

    /// Number of documents of a kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.collection(kind).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn contains(&self, kind: EntityKind, id: ObjectId) -> bool {
        self.collection(kind).is_some_and(|c| c.contains_key(&id))
    }

    // -----------------------------------------------------------------------
    // Write-time checks
    // -----------------------------------------------------------------------

    fn collection(&self, kind: EntityKind) -> Option<&BTreeMap<ObjectId, Value>> {
        self.collections.get(&kind)
    }

    fn check_unique(&self, kind: EntityKind, id: ObjectId, doc: &Value) -> Result<(), StoreError> {
        if !self.config.enforce_unique {
            return Ok(());
        }
        let collection = kind.collection();
        let fields = self
            .registry
            .unique_fields(collection)
            .map_err(StoreError::Schema)?;

        let errors: Vec<String> = fields
            .into_iter()
            .filter_map(|field| {
                let value = doc.get(field).filter(|v| !v.is_null())?;
                self.collection(kind)?
                    .iter()
                    .any(|(other, existing)| *other != id && existing.get(field) == Some(value))
                    .then(|| format!("{field} {value} already exists in {collection}"))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation {
                collection: collection.to_string(),
                errors,
            })
        }
    }

    /// A result's status must follow from its score, and a staff member may
    /// not hold more results for a questionnaire than its retakes allow.
    ///
    /// Skipped while the questionnaire is absent; dangling references are
    /// [`Self::check_references`]'s concern.
    fn check_questionnaire_result(
        &self,
        kind: EntityKind,
        id: ObjectId,
        doc: &Value,
    ) -> Result<(), StoreError> {
        if kind != EntityKind::QuestionnaireResult {
            return Ok(());
        }
        let collection = kind.collection();
        let result = decode::<QuestionnaireResult>(doc)?;
        let Some(quiz) = self
            .collection(EntityKind::Questionnaire)
            .and_then(|c| c.get(&result.questionnaire_id.id()))
            .map(decode::<Questionnaire>)
            .transpose()?
        else {
            return Ok(());
        };

        let mut errors = Vec::new();
        let expected = quiz.outcome_for(result.percentage_score);
        if result.status != expected {
            errors.push(format!(
                "status '{}' contradicts percentageScore {} against passScore {} (expected '{}')",
                result.status,
                result.percentage_score,
                quiz.pass_score.map_or_else(|| "none".to_string(), |p| p.to_string()),
                expected
            ));
        }

        let previous = self
            .list::<QuestionnaireResult>()?
            .iter()
            .filter(|r| {
                r.id != id
                    && r.questionnaire_id == result.questionnaire_id
                    && r.personnel == result.personnel
            })
            .count();
        if !quiz.allows_attempt(previous) {
            errors.push(format!(
                "{} {} has used all {} retakes of questionnaire {}",
                result.personnel.role(),
                result.personnel.id(),
                quiz.retakes_limit.unwrap_or_default(),
                quiz.id
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation {
                collection: collection.to_string(),
                errors,
            })
        }
    }

    fn check_references(&self, collection: &str, doc: &Value) -> Result<(), StoreError> {
        if !self.config.check_references {
            return Ok(());
        }
        let errors: Vec<String> = self
            .registry
            .references(collection, doc)
            .map_err(|e| StoreError::from_schema(collection, e))?
            .into_iter()
            .filter(|(kind, id)| !self.contains(*kind, *id))
            .map(|(kind, id)| format!("referenced {kind} {id} does not exist"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation {
                collection: collection.to_string(),
                errors,
            })
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

fn document_id(collection: &str, doc: &Value) -> Result<ObjectId, StoreError> {
    let raw = doc
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::invalid(collection, "document has no _id"))?;
    Ok(raw.parse()?)
}

fn decode<T: Entity>(value: &Value) -> Result<T, StoreError> {
    Ok(T::deserialize(value)?)
}

fn not_found(collection: &str, id: ObjectId) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

fn reject(collection: &str, err: &StoreError) {
    if matches!(err, StoreError::Validation { .. } | StoreError::Duplicate { .. }) {
        tracing::warn!(collection, error = %err, "write rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baise_core::entities::Customer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn insert_value_generates_id_and_timestamps() {
        let mut store = DocumentStore::default();
        let doc = store
            .insert_value("customers", json!({ "email": "a@acme.io" }))
            .unwrap();
        let id: ObjectId = doc["_id"].as_str().unwrap().parse().unwrap();
        assert!(store.contains(EntityKind::Customer, id));
        assert!(doc["creationTimestamp"].is_i64());
        assert_eq!(doc["projectsId"], json!([]));
    }

    #[test]
    fn unknown_collection_is_a_schema_error() {
        let mut store = DocumentStore::default();
        let err = store.insert_value("widgets", json!({})).unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut store = DocumentStore::default();
        let customer = Customer::new("a@acme.io");
        store.insert(&customer).unwrap();

        let mut again = customer.clone();
        again.email = "b@acme.io".into();
        let err = store.insert(&again).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.count(EntityKind::Customer), 1);
    }

    #[test]
    fn find_one_by_field() {
        let mut store = DocumentStore::default();
        store.insert(&Customer::new("a@acme.io")).unwrap();
        let found: Option<Customer> = store.find_one("email", &json!("a@acme.io")).unwrap();
        assert!(found.is_some());
        let missing: Option<Customer> = store.find_one("email", &json!("z@acme.io")).unwrap();
        assert!(missing.is_none());
    }
}
