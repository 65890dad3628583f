//! coalesce-core: contact cleanup engine
//!
//! This library provides pure Rust implementations of:
//! - Column header matching against a canonical schema (exact, alias, fuzzy)
//! - Duplicate detection via blocking, weighted pair scoring, and clustering
//! - Merge resolution with per-field strategies and an audit trail
//! - Field normalization (emails, phones, names, addresses)
//! - CSV ingestion and export adapters around the core

pub mod columns;
pub mod dedup;
pub mod error;
pub mod export;
pub mod ingest;
pub mod merge;
pub mod normalize;
pub mod pipeline;

// Re-export main types for convenience
pub use columns::{ColumnMatch, ColumnMatcher, MatchKind};
pub use dedup::{
    CancelFlag, DuplicateCluster, MatchConfig, RecordMatcher, ScoredPair,
};
pub use error::{ConfigError, ExportError, IngestError};
pub use ingest::{ColumnProfile, ColumnType, CsvReader, SchemaDetector};
pub use merge::{MergeDecision, MergeResolver, MergeResult, MergeStrategy};
pub use pipeline::{CleanPipeline, CleanReport};

pub use coalesce_domain::{
    default_contact_schema, CanonicalSchema, ColumnSpec, FieldKind, Record, RecordBatch,
};
