use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Project;
use crate::enums::{EntityKind, MaterialType};
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// Onboarding material attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingMaterials {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub project_id: Ref<Project>,
    #[serde(flatten)]
    pub material: Material,
    pub created_by_email: Option<String>,
    pub updated_by_email: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Material payload selected by `materialType`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "materialType", rename_all = "snake_case")]
pub enum Material {
    #[serde(rename_all = "camelCase")]
    File {
        file_upload_url: String,
        file_key: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Link {
        material_name: Option<String>,
        material_url: String,
    },
}

impl Material {
    #[must_use]
    pub const fn material_type(&self) -> MaterialType {
        match self {
            Self::File { .. } => MaterialType::File,
            Self::Link { .. } => MaterialType::Link,
        }
    }

    /// Where the material can be fetched.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::File {
                file_upload_url, ..
            } => file_upload_url,
            Self::Link { material_url, .. } => material_url,
        }
    }
}

impl TrainingMaterials {
    #[must_use]
    pub fn new(project_id: Ref<Project>, material: Material) -> Self {
        Self {
            id: ObjectId::new(),
            project_id,
            material,
            created_by_email: None,
            updated_by_email: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl_entity!(TrainingMaterials, EntityKind::TrainingMaterials, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        vec![self.project_id.target()]
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        if self.material.url().trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "{} material requires a url",
                self.material.material_type()
            )));
        }
        Ok(())
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use pretty_assertions::assert_eq;

    #[test]
    fn link_material_wire_shape() {
        let material = TrainingMaterials::new(
            Ref::new(ObjectId::new()),
            Material::Link {
                material_name: Some("Guidelines".into()),
                material_url: "https://docs.example.com/guide".into(),
            },
        );
        let json = serde_json::to_value(&material).unwrap();
        assert_eq!(json["materialType"], "link");
        assert_eq!(json["materialUrl"], "https://docs.example.com/guide");
        assert!(json.get("fileUploadUrl").is_none());
    }

    #[test]
    fn file_material_parses() {
        let json = serde_json::json!({
            "projectId": ObjectId::new().to_hex(),
            "materialType": "file",
            "fileUploadUrl": "https://cdn.example.com/intro.pdf",
            "updatedByEmail": "lead@example.com"
        });
        let material: TrainingMaterials = serde_json::from_value(json).unwrap();
        assert_eq!(material.material.material_type(), MaterialType::File);
        assert_eq!(material.updated_by_email.as_deref(), Some("lead@example.com"));
        assert!(material.check_invariants().is_ok());
    }

    #[test]
    fn file_without_url_is_rejected_by_serde() {
        let json = serde_json::json!({
            "projectId": ObjectId::new().to_hex(),
            "materialType": "file"
        });
        assert!(serde_json::from_value::<TrainingMaterials>(json).is_err());
    }
}
