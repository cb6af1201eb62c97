use std::borrow::Cow;
use std::collections::HashSet;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};

use crate::entities::{DataResource, Questionnaire};
use crate::entity::{FieldConstraint, FieldRule};
use crate::enums::{EntityKind, SourceType, StorageType};
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// The top-level unit of annotation work: source data, annotation scheme,
/// destination, and labeling estimates.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub project_name: String,
    pub project_description: Option<String>,
    pub project_start_date: Option<String>,
    pub project_start_date_timestamp: Option<EpochMillis>,
    pub origin_data_source: Option<OriginDataSource>,
    pub is_multiple_tasks: Option<bool>,
    pub annotation_category_type: Option<String>,
    pub annotation_type: Option<String>,
    pub is_annotation_column_free_text: Option<bool>,
    pub annotation_column: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub destination_data_source_details: Option<Destination>,
    pub labelling_metrics: Option<LabellingMetrics>,
    pub estimated_completion_time_in_minutes: Option<f64>,
    pub estimated_price: Option<f64>,
    pub project_questionnaire_id: Option<Ref<Questionnaire>>,
    pub label_studio_project_id: Option<String>,
    pub created_by_email: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

// ---------------------------------------------------------------------------
// Origin data source
// ---------------------------------------------------------------------------

/// Where the project's raw data comes from, selected by `sourceType`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "sourceType")]
pub enum OriginDataSource {
    #[serde(rename = "file upload", rename_all = "camelCase")]
    FileUpload {
        #[serde(default)]
        file_upload_details: Vec<UploadedFile>,
    },
    #[serde(rename = "file storage", rename_all = "camelCase")]
    FileStorage { storage_details: StorageDetails },
    #[serde(rename = "database", rename_all = "camelCase")]
    Database { database_details: DatabaseDetails },
}

impl OriginDataSource {
    #[must_use]
    pub const fn source_type(&self) -> SourceType {
        match self {
            Self::FileUpload { .. } => SourceType::FileUpload,
            Self::FileStorage { .. } => SourceType::FileStorage,
            Self::Database { .. } => SourceType::Database,
        }
    }

    /// Data resource the source points at, if any.
    #[must_use]
    pub const fn data_resource(&self) -> Option<Ref<DataResource>> {
        match self {
            Self::FileStorage {
                storage_details: StorageDetails::ExistingDataSource { data_resource_id },
            }
            | Self::Database {
                database_details: DatabaseDetails {
                    data_resource_id, ..
                },
            } => Some(*data_resource_id),
            Self::FileUpload { .. }
            | Self::FileStorage {
                storage_details: StorageDetails::LinkToBucket { .. },
            } => None,
        }
    }
}

/// A file uploaded directly into the project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub file_storage_url: Option<String>,
    pub file_storage_key: Option<String>,
    pub upload_date: Option<String>,
    pub filename: Option<String>,
    #[serde(default)]
    pub is_added_to_task: bool,
}

impl UploadedFile {
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            file_storage_url: None,
            file_storage_key: None,
            upload_date: None,
            filename: Some(filename.into()),
            is_added_to_task: false,
        }
    }
}

/// File-storage origin: a raw bucket link or an existing data resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "sourceType")]
pub enum StorageDetails {
    #[serde(rename = "link to bucket", rename_all = "camelCase")]
    LinkToBucket { bucket_link: String },
    #[serde(rename = "existing data source", rename_all = "camelCase")]
    ExistingDataSource { data_resource_id: Ref<DataResource> },
}

/// Database origin: a collection inside a database data resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseDetails {
    pub data_resource_id: Ref<DataResource>,
    pub name_of_collection: Option<String>,
    pub group_by_column: Option<String>,
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// Where labeled output goes, selected by the boolean
/// `hasDestinationStorageLocation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DestinationRecord", into = "DestinationRecord")]
pub enum Destination {
    /// `hasDestinationStorageLocation: true`: write back to a data resource.
    Resource {
        data_resource_id: Ref<DataResource>,
        data_resource_storage_type: Option<StorageType>,
    },
    /// `hasDestinationStorageLocation: false`: export to a file format.
    Export { export_format: String },
}

impl Destination {
    #[must_use]
    pub const fn has_destination_storage_location(&self) -> bool {
        matches!(self, Self::Resource { .. })
    }
}

/// Flat wire shape of [`Destination`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DestinationRecord {
    has_destination_storage_location: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_resource_id: Option<Ref<DataResource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_resource_storage_type: Option<StorageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    export_format: Option<String>,
}

impl TryFrom<DestinationRecord> for Destination {
    type Error = String;

    fn try_from(record: DestinationRecord) -> Result<Self, Self::Error> {
        if record.has_destination_storage_location {
            if record.export_format.is_some() {
                return Err(
                    "exportFormat is only valid without a destination storage location".into(),
                );
            }
            let data_resource_id = record
                .data_resource_id
                .ok_or("dataResourceId is required when hasDestinationStorageLocation is true")?;
            Ok(Self::Resource {
                data_resource_id,
                data_resource_storage_type: record.data_resource_storage_type,
            })
        } else {
            if record.data_resource_id.is_some() || record.data_resource_storage_type.is_some() {
                return Err(
                    "dataResourceId is only valid with a destination storage location".into(),
                );
            }
            let export_format = record
                .export_format
                .ok_or("exportFormat is required when hasDestinationStorageLocation is false")?;
            Ok(Self::Export { export_format })
        }
    }
}

impl From<Destination> for DestinationRecord {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Resource {
                data_resource_id,
                data_resource_storage_type,
            } => Self {
                has_destination_storage_location: true,
                data_resource_id: Some(data_resource_id),
                data_resource_storage_type,
                export_format: None,
            },
            Destination::Export { export_format } => Self {
                has_destination_storage_location: false,
                data_resource_id: None,
                data_resource_storage_type: None,
                export_format: Some(export_format),
            },
        }
    }
}

impl JsonSchema for Destination {
    fn schema_name() -> Cow<'static, str> {
        "Destination".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        let resource_id = generator.subschema_for::<Ref<DataResource>>();
        let storage_type = generator.subschema_for::<Option<StorageType>>();
        json_schema!({
            "type": "object",
            "oneOf": [
                {
                    "properties": {
                        "hasDestinationStorageLocation": { "const": true },
                        "dataResourceId": resource_id,
                        "dataResourceStorageType": storage_type,
                    },
                    "required": ["hasDestinationStorageLocation", "dataResourceId"],
                    "not": { "required": ["exportFormat"] }
                },
                {
                    "properties": {
                        "hasDestinationStorageLocation": { "const": false },
                        "exportFormat": { "type": "string" }
                    },
                    "required": ["hasDestinationStorageLocation", "exportFormat"],
                    "not": { "required": ["dataResourceId"] }
                }
            ]
        })
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Labeling throughput figures the estimates are derived from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabellingMetrics {
    pub time_taken_per_task_in_minutes: Option<f64>,
    pub number_of_annotators: Option<u32>,
    pub number_of_qa_reviewers: Option<u32>,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

impl Project {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            project_name: name.into(),
            project_description: None,
            project_start_date: None,
            project_start_date_timestamp: None,
            origin_data_source: None,
            is_multiple_tasks: None,
            annotation_category_type: None,
            annotation_type: None,
            is_annotation_column_free_text: None,
            annotation_column: None,
            labels: Vec::new(),
            destination_data_source_details: None,
            labelling_metrics: None,
            estimated_completion_time_in_minutes: None,
            estimated_price: None,
            project_questionnaire_id: None,
            label_studio_project_id: None,
            created_by_email: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }

    /// Uploaded files, empty unless the origin is a file upload.
    #[must_use]
    pub fn uploaded_files(&self) -> &[UploadedFile] {
        match &self.origin_data_source {
            Some(OriginDataSource::FileUpload {
                file_upload_details,
            }) => file_upload_details,
            _ => &[],
        }
    }

    /// Flag one uploaded file as assigned to a task. Other entries are untouched.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the project's origin is not a file
    /// upload, or `CoreError::NotFound` if no entry has `file_id`.
    pub fn mark_file_added_to_task(
        &mut self,
        file_id: ObjectId,
        now: EpochMillis,
    ) -> Result<(), CoreError> {
        let Some(OriginDataSource::FileUpload {
            file_upload_details,
        }) = &mut self.origin_data_source
        else {
            return Err(CoreError::Validation(format!(
                "project {} has no file upload origin",
                self.id
            )));
        };

        let entry = file_upload_details
            .iter_mut()
            .find(|file| file.id == file_id)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "uploaded_file".into(),
                id: file_id.to_string(),
            })?;
        entry.is_added_to_task = true;
        self.timestamps.touch(now);
        Ok(())
    }
}

impl_entity!(Project, EntityKind::Project, {
    const CONSTRAINTS: &'static [FieldConstraint] =
        &[FieldConstraint::new("projectName", FieldRule::MinLength(1))];

    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        let origin = self
            .origin_data_source
            .as_ref()
            .and_then(OriginDataSource::data_resource);
        let destination = match &self.destination_data_source_details {
            Some(Destination::Resource {
                data_resource_id, ..
            }) => Some(*data_resource_id),
            _ => None,
        };
        origin
            .into_iter()
            .chain(destination)
            .map(Ref::target)
            .chain(self.project_questionnaire_id.map(Ref::target))
            .collect()
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        if let Some(dup) = self.uploaded_files().iter().find(|f| !seen.insert(f.id)) {
            return Err(CoreError::Validation(format!(
                "duplicate uploaded file id {}",
                dup.id
            )));
        }
        if let Some(OriginDataSource::FileStorage {
            storage_details: StorageDetails::LinkToBucket { bucket_link },
        }) = &self.origin_data_source
        {
            if bucket_link.trim().is_empty() {
                return Err(CoreError::Validation("bucketLink must not be empty".into()));
            }
        }
        Ok(())
    }
});
