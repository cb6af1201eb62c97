//! Enumerated value sets, entity kinds, and the task status state machine.
//!
//! Enumerations serialize to the human strings stored in the documents
//! (`"storage bucket"`, `"qa review in progress"`, ...), so every variant is
//! renamed explicitly. Status enums with state machines provide
//! `allowed_next_states()` to enforce valid transitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The sixteen document kinds, one collection each.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    DataResource,
    Project,
    TrainingMaterials,
    Questionnaire,
    QuestionnaireQuestions,
    QuestionnaireResult,
    QaTester,
    Annotator,
    ResumeMetadata,
    Customer,
    QaTestersProjects,
    AnnotatorsProjects,
    Task,
    Batch,
    Payment,
    PersonnelPayout,
}

impl EntityKind {
    pub const ALL: [Self; 16] = [
        Self::DataResource,
        Self::Project,
        Self::TrainingMaterials,
        Self::Questionnaire,
        Self::QuestionnaireQuestions,
        Self::QuestionnaireResult,
        Self::QaTester,
        Self::Annotator,
        Self::ResumeMetadata,
        Self::Customer,
        Self::QaTestersProjects,
        Self::AnnotatorsProjects,
        Self::Task,
        Self::Batch,
        Self::Payment,
        Self::PersonnelPayout,
    ];

    /// Name of the collection holding documents of this kind.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::DataResource => "data_resources",
            Self::Project => "projects",
            Self::TrainingMaterials => "training_materials",
            Self::Questionnaire => "questionnaires",
            Self::QuestionnaireQuestions => "questionnaire_questions",
            Self::QuestionnaireResult => "questionnaire_results",
            Self::QaTester => "qa_testers",
            Self::Annotator => "annotators",
            Self::ResumeMetadata => "resume_metadata",
            Self::Customer => "customers",
            Self::QaTestersProjects => "qa_testers_projects",
            Self::AnnotatorsProjects => "annotators_projects",
            Self::Task => "tasks",
            Self::Batch => "batches",
            Self::Payment => "payments",
            Self::PersonnelPayout => "personnel_payouts",
        }
    }

    /// Look up a kind by its collection name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownCollection` if no kind uses `name`.
    pub fn from_collection(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == name)
            .ok_or_else(|| CoreError::UnknownCollection(name.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_collection(s)
    }
}

// ---------------------------------------------------------------------------
// StorageType
// ---------------------------------------------------------------------------

/// Kind of storage a data resource points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum StorageType {
    #[serde(rename = "database")]
    Database,
    #[serde(rename = "storage bucket")]
    StorageBucket,
}

impl StorageType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::StorageBucket => "storage bucket",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CloudProvider
// ---------------------------------------------------------------------------

/// Object-storage provider behind a `storage bucket` data resource.
///
/// Not stored; inferred from which credential group is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CloudProvider {
    Gcp,
    Azure,
    Aws,
}

impl CloudProvider {
    pub const ALL: [Self; 3] = [Self::Gcp, Self::Azure, Self::Aws];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gcp => "gcp",
            Self::Azure => "azure",
            Self::Aws => "aws",
        }
    }

    /// Document fields making up this provider's credential group.
    #[must_use]
    pub const fn credential_fields(self) -> &'static [&'static str] {
        match self {
            Self::Gcp => &[
                "storageBucketName",
                "cloudProjectId",
                "privateKeyId",
                "privateKey",
                "certUrl",
            ],
            Self::Azure => &["storageAccountKey", "blobSasUrl", "containerName"],
            Self::Aws => &["awsKeyId", "awsSecretAccessKey", "awsRegion", "bucketName"],
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Where a project's origin data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SourceType {
    #[serde(rename = "file upload")]
    FileUpload,
    #[serde(rename = "file storage")]
    FileStorage,
    #[serde(rename = "database")]
    Database,
}

impl SourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileUpload => "file upload",
            Self::FileStorage => "file storage",
            Self::Database => "database",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MaterialType
// ---------------------------------------------------------------------------

/// Shape of a training material: an uploaded file or an external link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    File,
    Link,
}

impl MaterialType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PersonnelRole
// ---------------------------------------------------------------------------

/// Staff role a questionnaire can be required for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PersonnelRole {
    Qa,
    Annotator,
}

impl PersonnelRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::Annotator => "annotator",
        }
    }

    /// Collection holding staff of this role.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Qa => EntityKind::QaTester,
            Self::Annotator => EntityKind::Annotator,
        }
    }
}

impl fmt::Display for PersonnelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EmploymentStatus
// ---------------------------------------------------------------------------

/// Employment status of an annotator or QA tester.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    #[default]
    Active,
    Suspended,
    Deactivated,
}

impl EmploymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deactivated => "deactivated",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QuestionnaireOutcome
// ---------------------------------------------------------------------------

/// Result of a single questionnaire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionnaireOutcome {
    Passed,
    Failed,
}

impl QuestionnaireOutcome {
    /// `Passed` iff `percentage_score >= pass_score`.
    #[must_use]
    pub fn from_score(percentage_score: f64, pass_score: f64) -> Self {
        if percentage_score >= pass_score {
            Self::Passed
        } else {
            Self::Failed
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for QuestionnaireOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskType
// ---------------------------------------------------------------------------

/// Kind of labeling work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum TaskType {
    #[serde(rename = "annotation")]
    Annotation,
    #[serde(rename = "qa review")]
    QaReview,
}

impl TaskType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annotation => "annotation",
            Self::QaReview => "qa review",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskCategory / TaskSubcategory
// ---------------------------------------------------------------------------

/// Media category of a task's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Text,
    Image,
    Video,
    Audio,
}

impl TaskCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labeling scheme within a category. Each subcategory belongs to exactly one
/// [`TaskCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum TaskSubcategory {
    #[serde(rename = "text classification")]
    TextClassification,
    #[serde(rename = "text generation")]
    TextGeneration,
    #[serde(rename = "image classification")]
    ImageClassification,
    #[serde(rename = "image segmentation")]
    ImageSegmentation,
    #[serde(rename = "video classification")]
    VideoClassification,
    #[serde(rename = "audio classification")]
    AudioClassification,
}

impl TaskSubcategory {
    #[must_use]
    pub const fn category(self) -> TaskCategory {
        match self {
            Self::TextClassification | Self::TextGeneration => TaskCategory::Text,
            Self::ImageClassification | Self::ImageSegmentation => TaskCategory::Image,
            Self::VideoClassification => TaskCategory::Video,
            Self::AudioClassification => TaskCategory::Audio,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextClassification => "text classification",
            Self::TextGeneration => "text generation",
            Self::ImageClassification => "image classification",
            Self::ImageSegmentation => "image segmentation",
            Self::VideoClassification => "video classification",
            Self::AudioClassification => "audio classification",
        }
    }
}

impl fmt::Display for TaskSubcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Status of a task through the annotation, QA, and customer-review pipeline.
///
/// ```text
/// pending → in progress → pending qa review → qa review in progress
///         → customer review → completed
/// ```
///
/// Progression is strictly forward, one step at a time.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "pending qa review")]
    PendingQaReview,
    #[serde(rename = "qa review in progress")]
    QaReviewInProgress,
    #[serde(rename = "customer review")]
    CustomerReview,
    #[serde(rename = "completed")]
    Completed,
}

impl TaskStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress],
            Self::InProgress => &[Self::PendingQaReview],
            Self::PendingQaReview => &[Self::QaReviewInProgress],
            Self::QaReviewInProgress => &[Self::CustomerReview],
            Self::CustomerReview => &[Self::Completed],
            Self::Completed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::PendingQaReview => "pending qa review",
            Self::QaReviewInProgress => "qa review in progress",
            Self::CustomerReview => "customer review",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BatchStatus
// ---------------------------------------------------------------------------

/// Upload status of a batch.
///
/// ```text
/// pending upload → batch uploaded
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum BatchStatus {
    #[default]
    #[serde(rename = "pending upload")]
    PendingUpload,
    #[serde(rename = "batch uploaded")]
    BatchUploaded,
}

impl BatchStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::PendingUpload => &[Self::BatchUploaded],
            Self::BatchUploaded => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingUpload => "pending upload",
            Self::BatchUploaded => "batch uploaded",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- Serde roundtrip tests ---

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(
        storage_bucket,
        StorageType,
        StorageType::StorageBucket,
        "storage bucket"
    );
    test_serde_roundtrip!(source_file_upload, SourceType, SourceType::FileUpload, "file upload");
    test_serde_roundtrip!(role_qa, PersonnelRole, PersonnelRole::Qa, "qa");
    test_serde_roundtrip!(
        employment_deactivated,
        EmploymentStatus,
        EmploymentStatus::Deactivated,
        "deactivated"
    );
    test_serde_roundtrip!(task_type_qa_review, TaskType, TaskType::QaReview, "qa review");
    test_serde_roundtrip!(
        subcategory_image_segmentation,
        TaskSubcategory,
        TaskSubcategory::ImageSegmentation,
        "image segmentation"
    );
    test_serde_roundtrip!(
        task_pending_qa_review,
        TaskStatus,
        TaskStatus::PendingQaReview,
        "pending qa review"
    );
    test_serde_roundtrip!(
        task_qa_review_in_progress,
        TaskStatus,
        TaskStatus::QaReviewInProgress,
        "qa review in progress"
    );
    test_serde_roundtrip!(
        batch_uploaded,
        BatchStatus,
        BatchStatus::BatchUploaded,
        "batch uploaded"
    );
    test_serde_roundtrip!(
        outcome_passed,
        QuestionnaireOutcome,
        QuestionnaireOutcome::Passed,
        "passed"
    );

    // --- Transition tests ---

    #[test]
    fn task_forward_sequence() {
        let sequence = [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::PendingQaReview,
            TaskStatus::QaReviewInProgress,
            TaskStatus::CustomerReview,
            TaskStatus::Completed,
        ];
        for pair in sequence.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn task_no_backward_or_skipping_transitions() {
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::CustomerReview));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::Completed.allowed_next_states().is_empty());
    }

    #[test]
    fn batch_transitions() {
        assert!(BatchStatus::PendingUpload.can_transition_to(BatchStatus::BatchUploaded));
        assert!(!BatchStatus::BatchUploaded.can_transition_to(BatchStatus::PendingUpload));
    }

    #[test]
    fn defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(BatchStatus::default(), BatchStatus::PendingUpload);
        assert_eq!(EmploymentStatus::default(), EmploymentStatus::Active);
    }

    #[test]
    fn subcategory_belongs_to_category() {
        assert_eq!(TaskSubcategory::TextGeneration.category(), TaskCategory::Text);
        assert_eq!(TaskSubcategory::ImageSegmentation.category(), TaskCategory::Image);
        assert_eq!(TaskSubcategory::VideoClassification.category(), TaskCategory::Video);
        assert_eq!(TaskSubcategory::AudioClassification.category(), TaskCategory::Audio);
    }

    #[test]
    fn outcome_threshold_is_inclusive() {
        assert_eq!(QuestionnaireOutcome::from_score(70.0, 70.0), QuestionnaireOutcome::Passed);
        assert_eq!(QuestionnaireOutcome::from_score(69.9, 70.0), QuestionnaireOutcome::Failed);
    }

    #[test]
    fn collection_names_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_collection(kind.collection()).unwrap(), kind);
        }
        assert!(EntityKind::from_collection("widgets").is_err());
    }

    #[test]
    fn provider_groups_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for provider in CloudProvider::ALL {
            for field in provider.credential_fields() {
                assert!(seen.insert(*field), "{field} appears twice");
            }
        }
    }

    // --- Display / as_str tests ---

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", StorageType::Database), "database");
        assert_eq!(format!("{}", SourceType::FileStorage), "file storage");
        assert_eq!(format!("{}", MaterialType::Link), "link");
        assert_eq!(format!("{}", TaskStatus::CustomerReview), "customer review");
        assert_eq!(format!("{}", TaskCategory::Audio), "audio");
        assert_eq!(format!("{}", BatchStatus::PendingUpload), "pending upload");
        assert_eq!(format!("{}", EntityKind::QaTestersProjects), "qa_testers_projects");
        assert_eq!(format!("{}", CloudProvider::Azure), "azure");
    }
}
