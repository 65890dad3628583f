//! Error types for pipeline construction and the I/O adapters

use thiserror::Error;

/// Configuration validation error, raised at construction time.
///
/// Matching itself never fails on malformed data; everything that can go
/// wrong is checked before the run starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("duplicate threshold must be within [0, 1], got {value}")]
    InvalidThreshold { value: f64 },
    #[error("field weight for '{field}' must be non-negative, got {weight}")]
    NegativeWeight { field: String, weight: f64 },
    #[error("field weights must not all be zero")]
    AllZeroWeights,
    #[error("no match fields configured")]
    NoMatchFields,
    #[error("canonical schema has no columns")]
    EmptyVocabulary,
}

/// Ingestion error type
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("input file not found: {path}")]
    FileNotFound { path: String },
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("input has no header row")]
    MissingHeader,
}

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize audit report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown output column: {column}")]
    UnknownColumn { column: String },
}
