use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::{FieldConstraint, UNIQUE_EMAIL};
use crate::enums::{EmploymentStatus, EntityKind, PersonnelRole};
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// Profile fields shared by both staff roles.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub sex: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub employment_status: EmploymentStatus,
    pub educational_qualification: Option<String>,
    #[serde(default)]
    pub number_of_strikes: u32,
    pub postal_address: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl PersonnelProfile {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: email.into(),
            sex: None,
            bio: None,
            date_of_birth: None,
            profile_image_url: None,
            employment_status: EmploymentStatus::Active,
            educational_qualification: None,
            number_of_strikes: 0,
            postal_address: None,
            address: None,
            country: None,
            city: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.employment_status == EmploymentStatus::Active
    }

    /// Record a strike and return the new total.
    pub fn add_strike(&mut self) -> u32 {
        self.number_of_strikes = self.number_of_strikes.saturating_add(1);
        self.number_of_strikes
    }
}

/// A QA tester who reviews annotated tasks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QaTester {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    #[serde(flatten)]
    pub profile: PersonnelProfile,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// An annotator who labels tasks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Annotator {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    #[serde(flatten)]
    pub profile: PersonnelProfile,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl QaTester {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            profile: PersonnelProfile::new(email),
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl Annotator {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            profile: PersonnelProfile::new(email),
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl_entity!(QaTester, EntityKind::QaTester, {
    const CONSTRAINTS: &'static [FieldConstraint] = &UNIQUE_EMAIL;
});

impl_entity!(Annotator, EntityKind::Annotator, {
    const CONSTRAINTS: &'static [FieldConstraint] = &UNIQUE_EMAIL;
});

/// Reference to a staff member in either personnel collection.
///
/// Stored as `personnelModel` (`"QaTester"` / `"Annotator"`) naming the
/// collection plus `personnelId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "personnelModel", content = "personnelId")]
pub enum PersonnelRef {
    QaTester(Ref<QaTester>),
    Annotator(Ref<Annotator>),
}

impl PersonnelRef {
    #[must_use]
    pub const fn id(self) -> ObjectId {
        match self {
            Self::QaTester(r) => r.id(),
            Self::Annotator(r) => r.id(),
        }
    }

    #[must_use]
    pub const fn role(self) -> PersonnelRole {
        match self {
            Self::QaTester(_) => PersonnelRole::Qa,
            Self::Annotator(_) => PersonnelRole::Annotator,
        }
    }

    #[must_use]
    pub const fn target(self) -> (EntityKind, ObjectId) {
        (self.role().kind(), self.id())
    }
}

impl From<Ref<QaTester>> for PersonnelRef {
    fn from(r: Ref<QaTester>) -> Self {
        Self::QaTester(r)
    }
}

impl From<Ref<Annotator>> for PersonnelRef {
    fn from(r: Ref<Annotator>) -> Self {
        Self::Annotator(r)
    }
}

/// Metadata of a résumé or onboarding document uploaded by a staff member.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMetadata {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    #[serde(flatten)]
    pub personnel: PersonnelRef,
    pub document_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<String>,
    pub uploaded_timestamp: Option<EpochMillis>,
    pub document_location_url: Option<String>,
    pub document_upload_key: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl ResumeMetadata {
    #[must_use]
    pub fn new(personnel: PersonnelRef) -> Self {
        let now = EpochMillis::now();
        Self {
            id: ObjectId::new(),
            personnel,
            document_name: None,
            file_type: None,
            file_size: None,
            uploaded_timestamp: Some(now),
            document_location_url: None,
            document_upload_key: None,
            timestamps: Timestamps::at(now),
        }
    }
}

impl_entity!(ResumeMetadata, EntityKind::ResumeMetadata, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        vec![self.personnel.target()]
    }
});
