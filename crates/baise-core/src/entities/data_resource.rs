use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Customer;
use crate::entity::{FieldConstraint, FieldRule};
use crate::enums::{CloudProvider, EntityKind, StorageType};
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// A named pointer to a database or cloud storage location with its access
/// credentials. Owned by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataResource {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub data_resource_name: String,
    #[serde(flatten)]
    pub storage: StorageLocation,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub data_resource_description: Option<String>,
    pub customer_email: Option<String>,
    pub customer_id: Option<Ref<Customer>>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

const fn default_active() -> bool {
    true
}

/// Storage branch selected by `storageType`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "storageType")]
pub enum StorageLocation {
    #[serde(rename = "database", rename_all = "camelCase")]
    Database {
        storage_location: Option<String>,
        connection_string: String,
    },
    #[serde(rename = "storage bucket")]
    StorageBucket(BucketCredentials),
}

/// Exactly one provider's credential group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum BucketCredentials {
    Gcp(GcsBucket),
    Azure(AzureBlobContainer),
    Aws(AwsS3Bucket),
}

/// Google Cloud Storage service-account credentials.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GcsBucket {
    pub storage_bucket_name: String,
    pub cloud_project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub cert_url: String,
}

/// Azure Blob Storage container access.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzureBlobContainer {
    pub storage_account_key: String,
    pub blob_sas_url: String,
    pub container_name: String,
}

/// AWS S3 key pair and bucket.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AwsS3Bucket {
    pub aws_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    pub bucket_name: String,
}

impl BucketCredentials {
    #[must_use]
    pub const fn provider(&self) -> CloudProvider {
        match self {
            Self::Gcp(_) => CloudProvider::Gcp,
            Self::Azure(_) => CloudProvider::Azure,
            Self::Aws(_) => CloudProvider::Aws,
        }
    }

    fn values(&self) -> Vec<&str> {
        match self {
            Self::Gcp(g) => vec![
                g.storage_bucket_name.as_str(),
                g.cloud_project_id.as_str(),
                g.private_key_id.as_str(),
                g.private_key.as_str(),
                g.cert_url.as_str(),
            ],
            Self::Azure(a) => vec![
                a.storage_account_key.as_str(),
                a.blob_sas_url.as_str(),
                a.container_name.as_str(),
            ],
            Self::Aws(a) => vec![
                a.aws_key_id.as_str(),
                a.aws_secret_access_key.as_str(),
                a.aws_region.as_str(),
                a.bucket_name.as_str(),
            ],
        }
    }
}

impl StorageLocation {
    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        match self {
            Self::Database { .. } => StorageType::Database,
            Self::StorageBucket(_) => StorageType::StorageBucket,
        }
    }
}

impl DataResource {
    #[must_use]
    pub fn new(name: impl Into<String>, storage: StorageLocation) -> Self {
        Self {
            id: ObjectId::new(),
            data_resource_name: name.into(),
            storage,
            is_active: true,
            data_resource_description: None,
            customer_email: None,
            customer_id: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }

    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        self.storage.storage_type()
    }
}

impl_entity!(DataResource, EntityKind::DataResource, {
    const CONSTRAINTS: &'static [FieldConstraint] = &[FieldConstraint::new(
        "dataResourceName",
        FieldRule::MinLength(1),
    )];

    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        self.customer_id.map(Ref::target).into_iter().collect()
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        match &self.storage {
            StorageLocation::Database {
                connection_string, ..
            } if connection_string.trim().is_empty() => Err(CoreError::Validation(
                "database data resource requires a connectionString".into(),
            )),
            StorageLocation::StorageBucket(creds)
                if creds.values().iter().any(|v| v.trim().is_empty()) =>
            {
                Err(CoreError::Validation(format!(
                    "{} credential group must be fully populated",
                    creds.provider()
                )))
            }
            _ => Ok(()),
        }
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use pretty_assertions::assert_eq;

    fn s3() -> StorageLocation {
        StorageLocation::StorageBucket(BucketCredentials::Aws(AwsS3Bucket {
            aws_key_id: "AKIA123".into(),
            aws_secret_access_key: "secret".into(),
            aws_region: "eu-west-1".into(),
            bucket_name: "raw-images".into(),
        }))
    }

    #[test]
    fn database_branch_serializes_flat() {
        let resource = DataResource::new(
            "warehouse",
            StorageLocation::Database {
                storage_location: Some("postgres".into()),
                connection_string: "postgres://db/warehouse".into(),
            },
        );
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["storageType"], "database");
        assert_eq!(json["connectionString"], "postgres://db/warehouse");
        assert!(json.get("awsKeyId").is_none());
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn bucket_branch_picks_provider_from_fields() {
        let json = serde_json::json!({
            "dataResourceName": "blobs",
            "storageType": "storage bucket",
            "storageAccountKey": "key",
            "blobSasUrl": "https://acct.blob.core.windows.net/?sas",
            "containerName": "images"
        });
        let resource: DataResource = serde_json::from_value(json).unwrap();
        match &resource.storage {
            StorageLocation::StorageBucket(creds) => {
                assert_eq!(creds.provider(), CloudProvider::Azure);
            }
            StorageLocation::Database { .. } => panic!("expected bucket"),
        }
        assert!(resource.is_active);
    }

    #[test]
    fn roundtrip_s3() {
        let resource = DataResource::new("images", s3());
        let json = serde_json::to_string(&resource).unwrap();
        let back: DataResource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resource);
        assert_eq!(back.storage_type(), StorageType::StorageBucket);
    }

    #[test]
    fn empty_connection_string_is_invalid() {
        let resource = DataResource::new(
            "warehouse",
            StorageLocation::Database {
                storage_location: None,
                connection_string: "  ".into(),
            },
        );
        assert!(resource.check_invariants().is_err());
    }

    #[test]
    fn references_customer() {
        let customer = ObjectId::new();
        let mut resource = DataResource::new("images", s3());
        resource.customer_id = Some(Ref::new(customer));
        assert_eq!(resource.references(), vec![(EntityKind::Customer, customer)]);
    }
}
