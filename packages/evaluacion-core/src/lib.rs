//! Record store for Evaluacion entities.
//!
//! Provides the entity type, sort directives, the in-memory store with
//! id assignment and upsert semantics, and snapshot persistence.

pub mod config;
pub mod entity;
pub mod error;
pub mod persistence;
pub mod sort;
pub mod store;

pub use entity::Evaluacion;
pub use store::{EvaluacionStore, SaveOutcome};
