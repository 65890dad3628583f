//! End-to-end cleaning pipeline
//!
//! Wires the stages together: map source columns onto the canonical schema,
//! rename them, detect duplicate clusters, and merge each cluster under the
//! configured strategies. Construction validates everything up front; `run`
//! itself cannot fail on data.

use std::collections::HashMap;

use tracing::info;

use coalesce_domain::{CanonicalSchema, RecordBatch};

use crate::columns::{ColumnMatch, ColumnMatcher, DEFAULT_COLUMN_THRESHOLD};
use crate::dedup::{CancelFlag, DuplicateCluster, MatchConfig, RecordMatcher};
use crate::error::ConfigError;
use crate::merge::{MergeResolver, MergeResult, MergeStrategy};
use crate::normalize::normalize_batch;

/// Outcome of a full cleaning run.
#[derive(Debug)]
pub struct CleanReport {
    /// Deduplicated batch with canonical column names
    pub batch: RecordBatch,
    /// How each source column was mapped
    pub column_matches: Vec<ColumnMatch>,
    /// Duplicate clusters found, sorted by confidence descending
    pub clusters: Vec<DuplicateCluster>,
    /// One merge result per cluster
    pub merges: Vec<MergeResult>,
    pub input_records: usize,
}

impl CleanReport {
    /// Records removed by merging.
    pub fn records_merged_away(&self) -> usize {
        self.input_records.saturating_sub(self.batch.len())
    }
}

/// Configured cleaning pipeline. Invalid configuration is rejected at
/// construction, never mid-run.
pub struct CleanPipeline {
    schema: CanonicalSchema,
    matcher: ColumnMatcher,
    match_config: MatchConfig,
    column_threshold: f64,
    normalize_values: bool,
    default_strategy: MergeStrategy,
    field_strategies: HashMap<String, MergeStrategy>,
}

impl CleanPipeline {
    pub fn new(schema: CanonicalSchema, match_config: MatchConfig) -> Result<Self, ConfigError> {
        match_config.validate()?;
        let matcher = ColumnMatcher::new(&schema)?;
        Ok(Self {
            schema,
            matcher,
            match_config,
            column_threshold: DEFAULT_COLUMN_THRESHOLD,
            normalize_values: true,
            default_strategy: MergeStrategy::default(),
            field_strategies: HashMap::new(),
        })
    }

    pub fn with_column_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold { value: threshold });
        }
        self.column_threshold = threshold;
        Ok(self)
    }

    /// Skip value normalization and match on fields exactly as entered.
    pub fn without_normalization(mut self) -> Self {
        self.normalize_values = false;
        self
    }

    pub fn with_default_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn with_field_strategy(mut self, field: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.field_strategies.insert(field.into(), strategy);
        self
    }

    /// Run the pipeline over a batch.
    pub fn run(&self, batch: &RecordBatch) -> CleanReport {
        self.run_with(batch, None)
    }

    /// Run with an optional cancellation flag threaded into pair scoring.
    pub fn run_with(&self, batch: &RecordBatch, cancel: Option<&CancelFlag>) -> CleanReport {
        let input_records = batch.len();

        // Map and rename columns to canonical names. Unmatched columns keep
        // their source names and ride along untouched.
        let column_matches = self.matcher.match_all(batch.columns(), self.column_threshold);
        let rename: HashMap<String, String> = column_matches
            .iter()
            .filter_map(|m| {
                m.canonical_column
                    .as_ref()
                    .map(|c| (m.source_column.clone(), c.clone()))
            })
            .collect();

        let mut canonical = batch.clone();
        canonical.rename_columns(&rename);
        info!(
            columns = canonical.columns().len(),
            mapped = rename.len(),
            "column mapping complete"
        );

        if self.normalize_values {
            normalize_batch(&mut canonical, &self.schema);
        }

        let mut record_matcher = RecordMatcher::new(&canonical, self.match_config.clone())
            .unwrap_or_else(|_| unreachable!("match config validated at construction"));
        let clusters = record_matcher.find_duplicates_with(cancel).to_vec();

        let mut resolver = MergeResolver::new(&canonical)
            .with_default_strategy(self.default_strategy);
        for (field, strategy) in &self.field_strategies {
            resolver = resolver.with_field_strategy(field.clone(), *strategy);
        }
        let (merged, merges) = resolver.bulk_merge(&clusters);

        info!(
            input = input_records,
            output = merged.len(),
            clusters = clusters.len(),
            "cleaning run complete"
        );
        CleanReport {
            batch: merged,
            column_matches,
            clusters,
            merges,
            input_records,
        }
    }
}
