//! # baise-core
//!
//! Entity definitions for the BAISE data-labeling platform.
//!
//! This crate provides the foundational types shared by every other crate:
//! - Entity structs for all sixteen document kinds (projects, tasks, batches, etc.)
//! - Enumerated value sets, including the task status state machine
//! - Object identifiers and collection-tagged references
//! - Epoch-millisecond timestamps with the creation/update pair
//! - The [`Entity`](entity::Entity) trait tying a type to its collection
//! - Cross-cutting error types

pub mod entities;
pub mod entity;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod time;

pub use entity::{Entity, FieldConstraint, FieldRule};
pub use errors::CoreError;
pub use ids::{ObjectId, Ref};
pub use time::{EpochMillis, Timestamps};
