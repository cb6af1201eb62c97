use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Annotator, Project, QaTester};
use crate::enums::EntityKind;
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// Per-project performance counters shared by both staff assignment kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPerformance {
    pub staff_email: Option<String>,
    pub project_name: Option<String>,
    #[serde(default)]
    pub number_of_strikes: u32,
    #[serde(default)]
    pub number_of_labelled_datasets: u32,
    pub average_annotations_per_minutes: Option<f64>,
    pub project_start_timestamp: Option<EpochMillis>,
    pub terminated_timestamp: Option<EpochMillis>,
    pub completion_timestamp: Option<EpochMillis>,
}

impl ProjectPerformance {
    fn check(&self) -> Result<(), CoreError> {
        let Some(start) = self.project_start_timestamp else {
            return Ok(());
        };
        for (field, end) in [
            ("terminatedTimestamp", self.terminated_timestamp),
            ("completionTimestamp", self.completion_timestamp),
        ] {
            if end.is_some_and(|end| end < start) {
                return Err(CoreError::Validation(format!(
                    "{field} precedes projectStartTimestamp"
                )));
            }
        }
        Ok(())
    }
}

/// A QA tester's assignment to a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QaTesterProject {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub staff_id: Ref<QaTester>,
    pub project_id: Ref<Project>,
    #[serde(flatten)]
    pub performance: ProjectPerformance,
    /// Average review time in minutes.
    pub review_time: Option<f64>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// An annotator's assignment to a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatorProject {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub staff_id: Ref<Annotator>,
    pub project_id: Ref<Project>,
    #[serde(flatten)]
    pub performance: ProjectPerformance,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl QaTesterProject {
    #[must_use]
    pub fn new(staff_id: Ref<QaTester>, project_id: Ref<Project>) -> Self {
        Self {
            id: ObjectId::new(),
            staff_id,
            project_id,
            performance: ProjectPerformance::default(),
            review_time: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl AnnotatorProject {
    #[must_use]
    pub fn new(staff_id: Ref<Annotator>, project_id: Ref<Project>) -> Self {
        Self {
            id: ObjectId::new(),
            staff_id,
            project_id,
            performance: ProjectPerformance::default(),
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl_entity!(QaTesterProject, EntityKind::QaTestersProjects, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        vec![self.staff_id.target(), self.project_id.target()]
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        self.performance.check()
    }
});

impl_entity!(AnnotatorProject, EntityKind::AnnotatorsProjects, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        vec![self.staff_id.target(), self.project_id.target()]
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        self.performance.check()
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use pretty_assertions::assert_eq;

    #[test]
    fn counters_default_to_zero() {
        let staff = ObjectId::new();
        let project = ObjectId::new();
        let assignment: AnnotatorProject = serde_json::from_value(serde_json::json!({
            "staffId": staff.to_hex(),
            "projectId": project.to_hex(),
            "staffEmail": "ann@example.com"
        }))
        .unwrap();
        assert_eq!(assignment.performance.number_of_strikes, 0);
        assert_eq!(assignment.performance.number_of_labelled_datasets, 0);
        assert_eq!(
            assignment.references(),
            vec![(EntityKind::Annotator, staff), (EntityKind::Project, project)]
        );
    }

    #[test]
    fn qa_assignment_carries_review_time() {
        let mut assignment =
            QaTesterProject::new(Ref::new(ObjectId::new()), Ref::new(ObjectId::new()));
        assignment.review_time = Some(4.5);
        let json = serde_json::to_value(&assignment).unwrap();
        assert_eq!(json["reviewTime"], 4.5);
        assert_eq!(json["numberOfStrikes"], 0);
        assert_eq!(assignment.references()[0].0, EntityKind::QaTester);
    }

    #[test]
    fn completion_before_start_is_invalid() {
        let mut assignment =
            AnnotatorProject::new(Ref::new(ObjectId::new()), Ref::new(ObjectId::new()));
        assignment.performance.project_start_timestamp = Some(EpochMillis(100));
        assignment.performance.completion_timestamp = Some(EpochMillis(50));
        assert!(assignment.check_invariants().is_err());

        assignment.performance.completion_timestamp = Some(EpochMillis(150));
        assert!(assignment.check_invariants().is_ok());
    }
}
