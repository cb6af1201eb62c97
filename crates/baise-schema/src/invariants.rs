//! Cross-field rules JSON Schema cannot express on the raw document.
//!
//! Typed deserialization ignores unknown keys, so a database data resource
//! carrying stray AWS keys would otherwise pass. These checks run on the raw
//! JSON before it is narrowed to the typed entity.

use baise_core::enums::{CloudProvider, EntityKind, SourceType, StorageType};
use serde_json::Value;

/// Fields that only belong to the database branch of a data resource.
const DATABASE_FIELDS: [&str; 2] = ["storageLocation", "connectionString"];

/// Nested payload key each origin `sourceType` carries.
const ORIGIN_PAYLOADS: [(SourceType, &str); 3] = [
    (SourceType::FileUpload, "fileUploadDetails"),
    (SourceType::FileStorage, "storageDetails"),
    (SourceType::Database, "databaseDetails"),
];

/// Run the raw checks for `kind` and return every violation found.
pub fn check(kind: EntityKind, doc: &Value) -> Vec<String> {
    match kind {
        EntityKind::DataResource => data_resource(doc),
        EntityKind::Project => project_origin(doc),
        _ => Vec::new(),
    }
}

fn is_set(doc: &Value, field: &str) -> bool {
    doc.get(field).is_some_and(|v| !v.is_null())
}

fn data_resource(doc: &Value) -> Vec<String> {
    let Some(storage_type) = doc.get("storageType").and_then(Value::as_str) else {
        return Vec::new();
    };

    let populated: Vec<CloudProvider> = CloudProvider::ALL
        .into_iter()
        .filter(|p| p.credential_fields().iter().any(|f| is_set(doc, f)))
        .collect();

    let mut errors = Vec::new();
    if storage_type == StorageType::Database.as_str() {
        for provider in populated {
            errors.push(format!(
                "storageType 'database' must not carry {provider} credential fields"
            ));
        }
    } else if storage_type == StorageType::StorageBucket.as_str() {
        match populated.as_slice() {
            [_] => {}
            [] => errors.push(
                "storageType 'storage bucket' requires one provider credential group".to_string(),
            ),
            many => {
                let names: Vec<&str> = many.iter().map(|p| p.as_str()).collect();
                errors.push(format!(
                    "storageType 'storage bucket' must carry exactly one provider credential \
                     group, found {}",
                    names.join(", ")
                ));
            }
        }
        for field in DATABASE_FIELDS.into_iter().filter(|f| is_set(doc, f)) {
            errors.push(format!(
                "storageType 'storage bucket' must not carry database field '{field}'"
            ));
        }
    }
    errors
}

fn project_origin(doc: &Value) -> Vec<String> {
    let Some(origin) = doc.get("originDataSource").filter(|v| v.is_object()) else {
        return Vec::new();
    };
    let Some(source_type) = origin.get("sourceType").and_then(Value::as_str) else {
        return Vec::new();
    };

    ORIGIN_PAYLOADS
        .iter()
        .filter(|(ty, field)| ty.as_str() != source_type && is_set(origin, field))
        .map(|(_, field)| {
            format!("originDataSource with sourceType '{source_type}' must not carry '{field}'")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn database_with_cloud_fields_rejected() {
        let doc = json!({
            "storageType": "database",
            "connectionString": "postgres://db",
            "awsKeyId": "AKIA"
        });
        let errors = check(EntityKind::DataResource, &doc);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("aws"), "{errors:?}");
    }

    #[test]
    fn null_cloud_fields_are_unset() {
        let doc = json!({
            "storageType": "database",
            "connectionString": "postgres://db",
            "awsKeyId": null
        });
        assert!(check(EntityKind::DataResource, &doc).is_empty());
    }

    #[test]
    fn bucket_with_two_groups_rejected() {
        let doc = json!({
            "storageType": "storage bucket",
            "containerName": "images",
            "bucketName": "raw"
        });
        let errors = check(EntityKind::DataResource, &doc);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("exactly one"));
    }

    #[test]
    fn bucket_with_connection_string_rejected() {
        let doc = json!({
            "storageType": "storage bucket",
            "awsKeyId": "AKIA",
            "awsSecretAccessKey": "s",
            "awsRegion": "us-east-1",
            "bucketName": "raw",
            "connectionString": "postgres://db"
        });
        assert_eq!(check(EntityKind::DataResource, &doc).len(), 1);
    }

    #[test]
    fn origin_payload_must_match_source_type() {
        let doc = json!({
            "projectName": "p",
            "originDataSource": {
                "sourceType": "file upload",
                "fileUploadDetails": [],
                "databaseDetails": { "dataResourceId": "0123456789abcdef01234567" }
            }
        });
        let errors = check(EntityKind::Project, &doc);
        assert_eq!(
            errors,
            vec!["originDataSource with sourceType 'file upload' must not carry 'databaseDetails'"]
        );
    }

    #[test]
    fn other_kinds_have_no_raw_checks() {
        assert!(check(EntityKind::Task, &json!({ "awsKeyId": "x" })).is_empty());
    }
}
