//! Entity structs for all sixteen document kinds.
//!
//! Each entity maps to one collection (see [`EntityKind::collection`]). All
//! structs derive `Serialize`, `Deserialize`, and `JsonSchema`; wire field names
//! are camelCase, the identifier is `_id`, and the creation/update timestamp
//! pair is flattened into the document.
//!
//! [`EntityKind::collection`]: crate::enums::EntityKind::collection

/// Implement [`Entity`](crate::entity::Entity) for a struct with `id` and
/// `timestamps` fields. Extra trait items go in the optional trailing block.
macro_rules! impl_entity {
    ($ty:ty, $kind:expr $(, { $($body:tt)* })?) => {
        impl $crate::entity::Entity for $ty {
            const KIND: $crate::enums::EntityKind = $kind;

            fn id(&self) -> $crate::ids::ObjectId {
                self.id
            }

            fn timestamps(&self) -> &$crate::time::Timestamps {
                &self.timestamps
            }

            fn timestamps_mut(&mut self) -> &mut $crate::time::Timestamps {
                &mut self.timestamps
            }

            $($($body)*)?
        }
    };
}

mod assignment;
mod batch;
mod billing;
mod customer;
mod data_resource;
mod personnel;
mod project;
mod questionnaire;
mod task;
mod training;

pub use assignment::{AnnotatorProject, ProjectPerformance, QaTesterProject};
pub use batch::Batch;
pub use billing::{Payment, PersonnelPayout};
pub use customer::{Customer, PostalAddress};
pub use data_resource::{
    AwsS3Bucket, AzureBlobContainer, BucketCredentials, DataResource, GcsBucket, StorageLocation,
};
pub use personnel::{Annotator, PersonnelProfile, PersonnelRef, QaTester, ResumeMetadata};
pub use project::{
    DatabaseDetails, Destination, LabellingMetrics, OriginDataSource, Project, StorageDetails,
    UploadedFile,
};
pub use questionnaire::{Questionnaire, QuestionnaireQuestions, QuestionnaireResult, score_answers};
pub use task::Task;
pub use training::{Material, TrainingMaterials};
