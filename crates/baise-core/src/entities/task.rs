use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Annotator, Customer, Project, QaTester};
use crate::enums::{EntityKind, TaskCategory, TaskStatus, TaskSubcategory, TaskType};
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// One unit of labeling work moving through annotation, QA review, and
/// customer review.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub project_id: Ref<Project>,
    pub label_studio_task_id: Option<String>,
    pub task_type: TaskType,
    pub task_type_category: TaskCategory,
    pub task_type_subcategory: TaskSubcategory,
    /// Opaque payload handed to the labeling tool.
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub task_status: TaskStatus,
    #[serde(default)]
    pub is_annotated: bool,
    pub annotator_completion_timestamp: Option<EpochMillis>,
    #[serde(default)]
    pub is_qa_reviewed: bool,
    pub qa_review_completion_timestamp: Option<EpochMillis>,
    pub annotator_email: Option<String>,
    pub annotator_id: Option<Ref<Annotator>>,
    pub qa_tester_email: Option<String>,
    pub qa_tester_id: Option<Ref<QaTester>>,
    pub annotation_start_timestamp: Option<EpochMillis>,
    pub annotation_end_timestamp: Option<EpochMillis>,
    /// Milliseconds between annotation start and end.
    pub annotation_duration: Option<i64>,
    pub qa_start_timestamp: Option<EpochMillis>,
    pub qa_end_timestamp: Option<EpochMillis>,
    /// Milliseconds between QA start and end.
    pub qa_review_duration: Option<i64>,
    pub customer_email: Option<String>,
    pub customer_id: Option<Ref<Customer>>,
    pub customer_review_status: Option<String>,
    pub customer_review_timestamp: Option<EpochMillis>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Task {
    /// New pending task. The category follows from the subcategory.
    #[must_use]
    pub fn new(
        project_id: Ref<Project>,
        task_type: TaskType,
        subcategory: TaskSubcategory,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            project_id,
            label_studio_task_id: None,
            task_type,
            task_type_category: subcategory.category(),
            task_type_subcategory: subcategory,
            data: None,
            task_status: TaskStatus::Pending,
            is_annotated: false,
            annotator_completion_timestamp: None,
            is_qa_reviewed: false,
            qa_review_completion_timestamp: None,
            annotator_email: None,
            annotator_id: None,
            qa_tester_email: None,
            qa_tester_id: None,
            annotation_start_timestamp: None,
            annotation_end_timestamp: None,
            annotation_duration: None,
            qa_start_timestamp: None,
            qa_end_timestamp: None,
            qa_review_duration: None,
            customer_email: None,
            customer_id: None,
            customer_review_status: None,
            customer_review_timestamp: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }

    /// Advance the task one phase and stamp that phase's timestamps.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless `next` is the single
    /// state following the current one.
    pub fn transition_to(&mut self, next: TaskStatus, now: EpochMillis) -> Result<(), CoreError> {
        if !self.task_status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: EntityKind::Task.to_string(),
                id: self.id.to_string(),
                from: self.task_status.to_string(),
                to: next.to_string(),
            });
        }

        match next {
            TaskStatus::Pending => {}
            TaskStatus::InProgress => {
                self.annotation_start_timestamp = Some(now);
            }
            TaskStatus::PendingQaReview => {
                self.annotation_end_timestamp = Some(now);
                self.annotation_duration = self
                    .annotation_start_timestamp
                    .map(|start| now.millis_since(start));
                self.is_annotated = true;
                self.annotator_completion_timestamp = Some(now);
            }
            TaskStatus::QaReviewInProgress => {
                self.qa_start_timestamp = Some(now);
            }
            TaskStatus::CustomerReview => {
                self.qa_end_timestamp = Some(now);
                self.qa_review_duration =
                    self.qa_start_timestamp.map(|start| now.millis_since(start));
                self.is_qa_reviewed = true;
                self.qa_review_completion_timestamp = Some(now);
            }
            TaskStatus::Completed => {
                self.customer_review_timestamp = Some(now);
            }
        }

        self.task_status = next;
        self.timestamps.touch(now);
        Ok(())
    }

    /// First field [`Self::transition_to`] would have stamped on entering the
    /// current state that is still unset.
    fn missing_phase_stamp(&self) -> Option<&'static str> {
        match self.task_status {
            TaskStatus::Pending => None,
            TaskStatus::InProgress => self
                .annotation_start_timestamp
                .is_none()
                .then_some("annotationStartTimestamp"),
            TaskStatus::PendingQaReview => {
                if self.annotation_end_timestamp.is_none() {
                    Some("annotationEndTimestamp")
                } else if self.annotator_completion_timestamp.is_none() {
                    Some("annotatorCompletionTimestamp")
                } else {
                    (!self.is_annotated).then_some("isAnnotated")
                }
            }
            TaskStatus::QaReviewInProgress => {
                self.qa_start_timestamp.is_none().then_some("qaStartTimestamp")
            }
            TaskStatus::CustomerReview => {
                if self.qa_end_timestamp.is_none() {
                    Some("qaEndTimestamp")
                } else if self.qa_review_completion_timestamp.is_none() {
                    Some("qaReviewCompletionTimestamp")
                } else {
                    (!self.is_qa_reviewed).then_some("isQaReviewed")
                }
            }
            TaskStatus::Completed => self
                .customer_review_timestamp
                .is_none()
                .then_some("customerReviewTimestamp"),
        }
    }
}

impl_entity!(Task, EntityKind::Task, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        std::iter::once(self.project_id.target())
            .chain(self.annotator_id.map(Ref::target))
            .chain(self.qa_tester_id.map(Ref::target))
            .chain(self.customer_id.map(Ref::target))
            .collect()
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        if self.task_type_subcategory.category() != self.task_type_category {
            return Err(CoreError::Validation(format!(
                "taskTypeSubcategory '{}' does not belong to taskTypeCategory '{}'",
                self.task_type_subcategory, self.task_type_category
            )));
        }
        if self.is_annotated && self.task_status < TaskStatus::PendingQaReview {
            return Err(CoreError::Validation(format!(
                "task marked annotated while still '{}'",
                self.task_status
            )));
        }
        if self.is_qa_reviewed && self.task_status < TaskStatus::CustomerReview {
            return Err(CoreError::Validation(format!(
                "task marked QA reviewed while still '{}'",
                self.task_status
            )));
        }
        Ok(())
    }

    fn check_transition(&self, previous: &Self) -> Result<(), CoreError> {
        let (from, to) = (previous.task_status, self.task_status);
        if from == to {
            return Ok(());
        }
        if !from.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                entity_type: EntityKind::Task.to_string(),
                id: self.id.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        match self.missing_phase_stamp() {
            Some(field) => Err(CoreError::Validation(format!(
                "task entering '{to}' is missing {field}"
            ))),
            None => Ok(()),
        }
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use pretty_assertions::assert_eq;

    fn task() -> Task {
        let mut task = Task::new(
            Ref::new(ObjectId::new()),
            TaskType::Annotation,
            TaskSubcategory::ImageSegmentation,
        );
        task.timestamps = Timestamps::at(EpochMillis(0));
        task
    }

    #[test]
    fn new_task_defaults() {
        let task = task();
        assert_eq!(task.task_status, TaskStatus::Pending);
        assert_eq!(task.task_type_category, TaskCategory::Image);
        assert!(!task.is_annotated);
        assert!(!task.is_qa_reviewed);
        assert!(task.check_invariants().is_ok());
    }

    #[test]
    fn full_lifecycle_stamps_each_phase() {
        let mut task = task();
        task.transition_to(TaskStatus::InProgress, EpochMillis(1_000)).unwrap();
        task.transition_to(TaskStatus::PendingQaReview, EpochMillis(61_000)).unwrap();
        assert_eq!(task.annotation_start_timestamp, Some(EpochMillis(1_000)));
        assert_eq!(task.annotation_end_timestamp, Some(EpochMillis(61_000)));
        assert_eq!(task.annotation_duration, Some(60_000));
        assert!(task.is_annotated);
        assert_eq!(task.annotator_completion_timestamp, Some(EpochMillis(61_000)));

        task.transition_to(TaskStatus::QaReviewInProgress, EpochMillis(70_000)).unwrap();
        task.transition_to(TaskStatus::CustomerReview, EpochMillis(100_000)).unwrap();
        assert_eq!(task.qa_review_duration, Some(30_000));
        assert!(task.is_qa_reviewed);
        assert_eq!(task.qa_review_completion_timestamp, Some(EpochMillis(100_000)));

        task.transition_to(TaskStatus::Completed, EpochMillis(120_000)).unwrap();
        assert_eq!(task.customer_review_timestamp, Some(EpochMillis(120_000)));
        assert_eq!(task.task_status, TaskStatus::Completed);
        assert_eq!(task.timestamps.updated_timestamp, EpochMillis(120_000));
        assert_eq!(task.timestamps.creation_timestamp, EpochMillis(0));
        assert!(task.check_invariants().is_ok());
    }

    #[test]
    fn skipping_or_reversing_is_rejected() {
        let mut task = task();
        let err = task
            .transition_to(TaskStatus::Completed, EpochMillis(1))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(task.task_status, TaskStatus::Pending);

        task.transition_to(TaskStatus::InProgress, EpochMillis(1)).unwrap();
        assert!(task.transition_to(TaskStatus::Pending, EpochMillis(2)).is_err());
        assert!(task.transition_to(TaskStatus::InProgress, EpochMillis(2)).is_err());
        assert_eq!(task.annotation_start_timestamp, Some(EpochMillis(1)));
    }

    #[test]
    fn replacement_must_not_move_backwards() {
        let before = task();
        let mut after = before.clone();
        after.transition_to(TaskStatus::InProgress, EpochMillis(5)).unwrap();
        assert!(after.check_transition(&before).is_ok());
        assert!(after.check_transition(&after.clone()).is_ok());
        assert!(before.check_transition(&after).is_err());
    }

    #[test]
    fn forward_replacement_needs_the_phase_stamps() {
        let before = task();
        let mut bumped = before.clone();
        bumped.task_status = TaskStatus::InProgress;
        let err = bumped.check_transition(&before).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("annotationStartTimestamp"));

        let mut annotating = before.clone();
        annotating.transition_to(TaskStatus::InProgress, EpochMillis(5)).unwrap();
        let mut done = annotating.clone();
        done.task_status = TaskStatus::PendingQaReview;
        done.annotation_end_timestamp = Some(EpochMillis(9));
        let err = done.check_transition(&annotating).unwrap_err();
        assert!(err.to_string().contains("annotatorCompletionTimestamp"));

        done.annotator_completion_timestamp = Some(EpochMillis(9));
        done.is_annotated = true;
        assert!(done.check_transition(&annotating).is_ok());
    }

    #[test]
    fn mismatched_subcategory_is_invalid() {
        let mut task = task();
        task.task_type_category = TaskCategory::Audio;
        let err = task.check_invariants().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn wire_names_and_defaults() {
        let project = ObjectId::new();
        let task: Task = serde_json::from_value(serde_json::json!({
            "projectId": project.to_hex(),
            "taskType": "qa review",
            "taskTypeCategory": "text",
            "taskTypeSubcategory": "text generation",
            "data": { "text": "hello" }
        }))
        .unwrap();
        assert_eq!(task.task_status, TaskStatus::Pending);
        assert_eq!(task.task_type, TaskType::QaReview);
        assert_eq!(task.references(), vec![(EntityKind::Project, project)]);

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["taskStatus"], "pending");
        assert_eq!(json["data"]["text"], "hello");
    }
}
