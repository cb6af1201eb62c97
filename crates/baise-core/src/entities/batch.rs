use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Customer, Project, QaTester, Task};
use crate::enums::{BatchStatus, EntityKind};
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// A numbered group of tasks uploaded together.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub batch_number: u32,
    pub project_id: Ref<Project>,
    pub customer_id: Option<Ref<Customer>>,
    #[serde(default)]
    pub is_uploaded: bool,
    #[serde(default)]
    pub status: BatchStatus,
    pub qa_tester_id: Option<Ref<QaTester>>,
    /// Member tasks in upload order.
    #[serde(default)]
    pub task_ids: Vec<Ref<Task>>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Batch {
    #[must_use]
    pub fn new(project_id: Ref<Project>, batch_number: u32) -> Self {
        Self {
            id: ObjectId::new(),
            batch_number,
            project_id,
            customer_id: None,
            is_uploaded: false,
            status: BatchStatus::PendingUpload,
            qa_tester_id: None,
            task_ids: Vec::new(),
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }

    /// Flag the batch as uploaded.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if it was already uploaded.
    pub fn mark_uploaded(&mut self, now: EpochMillis) -> Result<(), CoreError> {
        let next = BatchStatus::BatchUploaded;
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity_type: EntityKind::Batch.to_string(),
                id: self.id.to_string(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.is_uploaded = true;
        self.timestamps.touch(now);
        Ok(())
    }
}

impl_entity!(Batch, EntityKind::Batch, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        std::iter::once(self.project_id.target())
            .chain(self.customer_id.map(Ref::target))
            .chain(self.qa_tester_id.map(Ref::target))
            .chain(self.task_ids.iter().map(|t| t.target()))
            .collect()
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        if self.is_uploaded != (self.status == BatchStatus::BatchUploaded) {
            return Err(CoreError::Validation(format!(
                "isUploaded={} contradicts status '{}'",
                self.is_uploaded, self.status
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.task_ids.iter().find(|t| !seen.insert(t.id())) {
            return Err(CoreError::Validation(format!(
                "task {dup} listed twice in batch {}",
                self.batch_number
            )));
        }
        Ok(())
    }

    fn check_transition(&self, previous: &Self) -> Result<(), CoreError> {
        let (from, to) = (previous.status, self.status);
        if from == to || from.can_transition_to(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity_type: EntityKind::Batch.to_string(),
                id: self.id.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use pretty_assertions::assert_eq;

    #[test]
    fn mark_uploaded_once() {
        let mut batch = Batch::new(Ref::new(ObjectId::new()), 3);
        batch.timestamps = Timestamps::at(EpochMillis(10));
        assert_eq!(batch.status, BatchStatus::PendingUpload);

        batch.mark_uploaded(EpochMillis(20)).unwrap();
        assert!(batch.is_uploaded);
        assert_eq!(batch.status, BatchStatus::BatchUploaded);
        assert_eq!(batch.timestamps.updated_timestamp, EpochMillis(20));
        assert!(batch.check_invariants().is_ok());

        assert!(matches!(
            batch.mark_uploaded(EpochMillis(30)),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn task_order_preserved() {
        let tasks: Vec<Ref<Task>> = (0..3).map(|_| Ref::new(ObjectId::new())).collect();
        let mut batch = Batch::new(Ref::new(ObjectId::new()), 1);
        batch.task_ids.clone_from(&tasks);

        let json = serde_json::to_string(&batch).unwrap();
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.task_ids, tasks);
    }

    #[test]
    fn status_flag_mismatch_is_invalid() {
        let mut batch = Batch::new(Ref::new(ObjectId::new()), 1);
        batch.is_uploaded = true;
        assert!(batch.check_invariants().is_err());
    }

    #[test]
    fn duplicate_task_is_invalid() {
        let task = Ref::new(ObjectId::new());
        let mut batch = Batch::new(Ref::new(ObjectId::new()), 1);
        batch.task_ids = vec![task, task];
        assert!(batch.check_invariants().is_err());
    }
}
