//! Domain types shared across the coalesce suite
//!
//! This crate provides the canonical data model for contact cleanup:
//! - Record / RecordBatch: schema-agnostic tabular records
//! - CanonicalSchema / ColumnSpec: the target vocabulary with aliases
//! - FieldKind: per-column semantics (email, phone, name, free text)

pub mod record;
pub mod schema;

pub use record::*;
pub use schema::*;
