//! # baise-schema
//!
//! JSON Schema generation, validation, and normalization for BAISE collections.
//!
//! This crate provides:
//! - `SchemaRegistry`: one JSON Schema per collection, built once per process
//! - Validation of raw documents against the schema plus the cross-field rules
//!   JSON Schema cannot express (credential-group exclusivity)
//! - Normalization: default population through the typed entity
//!
//! ## Architecture
//!
//! Entity types are defined in `baise-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types, merges in their field constraints, and
//! provides the registry and validation layer. The document store and the
//! CLI depend on it at the point of record write.

pub mod error;
mod invariants;
pub mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
