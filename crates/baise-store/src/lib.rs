//! # baise-store
//!
//! In-memory document store for BAISE collections.
//!
//! One collection per entity kind, documents keyed by `_id` and held in
//! document-store shape (JSON). Every write passes through the schema
//! registry, so constraint violations surface as
//! [`StoreError::Validation`] at the point of record write:
//!
//! - schema, field constraint, and invariant checks
//! - unique fields across the collection (`store.enforce_unique`)
//! - outgoing references must resolve (`store.check_references`, off by default)
//! - `creationTimestamp` fixed at insert; `updatedTimestamp` only moves forward
//! - task and batch status may only step forward on update
//!
//! There is no delete.

mod error;
mod store;

pub use error::StoreError;
pub use store::{DocumentStore, Personnel};
