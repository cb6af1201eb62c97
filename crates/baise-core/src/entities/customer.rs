use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Payment, Project};
use crate::entity::{FieldConstraint, UNIQUE_EMAIL};
use crate::enums::EntityKind;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// A paying customer who owns projects and data resources.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub customer_name: Option<String>,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<PostalAddress>,
    #[serde(default)]
    pub projects_id: Vec<Ref<Project>>,
    #[serde(default)]
    pub payments_id: Vec<Ref<Payment>>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub country: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<u32>,
    pub street: Option<String>,
    pub street_number: Option<u32>,
}

impl Customer {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            customer_name: None,
            email: email.into(),
            profile_image_url: None,
            phone_number: None,
            address: None,
            projects_id: Vec::new(),
            payments_id: Vec::new(),
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl_entity!(Customer, EntityKind::Customer, {
    const CONSTRAINTS: &'static [FieldConstraint] = &UNIQUE_EMAIL;

    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        self.projects_id
            .iter()
            .map(|r| r.target())
            .chain(self.payments_id.iter().map(|r| r.target()))
            .collect()
    }
});
