//! Policy-driven merging of duplicate clusters
//!
//! Each cluster collapses into a single record, one field at a time, under a
//! per-field strategy with a configurable default. Every field resolution is
//! recorded as a [`MergeDecision`] so the merge is auditable.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coalesce_domain::{Record, RecordBatch};

use crate::dedup::DuplicateCluster;

/// How to choose a surviving value when cluster members disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Value from the lowest record index
    KeepFirst,
    /// Value from the highest record index
    KeepLast,
    /// Longest value by character count; ties go to the earlier record
    KeepLongest,
    /// Value from the record with the most non-empty fields overall
    #[default]
    KeepMostComplete,
    /// All distinct values joined with "; ", first-seen order
    Concatenate,
    /// Flagged for human review; resolves like KeepFirst in batch runs
    Manual,
}

impl MergeStrategy {
    /// Parse a strategy name. Unknown names fall back to `KeepFirst`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "keep_first" => Self::KeepFirst,
            "keep_last" => Self::KeepLast,
            "keep_longest" => Self::KeepLongest,
            "keep_most_complete" => Self::KeepMostComplete,
            "concatenate" => Self::Concatenate,
            "manual" => Self::Manual,
            _ => Self::KeepFirst,
        }
    }
}

/// One field-level choice made during a merge.
#[derive(Clone, Debug, Serialize)]
pub struct MergeDecision {
    pub field: String,
    pub chosen_value: String,
    /// Record index the chosen value came from
    pub source_index: usize,
    pub strategy: MergeStrategy,
    /// The competing (index, value) pairs that were not chosen; every entry
    /// differs in value from `chosen_value`. Empty when members agreed.
    pub alternatives: Vec<(usize, String)>,
}

/// A merged cluster with its audit trail.
#[derive(Clone, Debug, Serialize)]
pub struct MergeResult {
    pub merged_record: Record,
    /// Cluster member indices, ascending
    pub source_indices: Vec<usize>,
    /// One decision per field, in column order
    pub decisions: Vec<MergeDecision>,
    /// Fraction of fields that merged without competing alternatives
    pub confidence: f64,
}

/// Applies merge strategies over clusters of a batch.
pub struct MergeResolver<'a> {
    batch: &'a RecordBatch,
    default_strategy: MergeStrategy,
    field_strategies: HashMap<String, MergeStrategy>,
}

impl<'a> MergeResolver<'a> {
    pub fn new(batch: &'a RecordBatch) -> Self {
        Self {
            batch,
            default_strategy: MergeStrategy::default(),
            field_strategies: HashMap::new(),
        }
    }

    pub fn with_default_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn with_field_strategy(mut self, field: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.field_strategies.insert(field.into(), strategy);
        self
    }

    pub fn with_field_strategies(mut self, strategies: HashMap<String, MergeStrategy>) -> Self {
        self.field_strategies = strategies;
        self
    }

    fn strategy_for(&self, field: &str) -> MergeStrategy {
        self.field_strategies
            .get(field)
            .copied()
            .unwrap_or(self.default_strategy)
    }

    /// Resolve one field across the cluster members.
    ///
    /// Always returns a decision, so the audit trail shows where every merged
    /// value came from. All-empty fields survive as "" from the first index;
    /// agreeing members leave the alternatives list empty.
    fn resolve_field(
        &self,
        field: &str,
        indices: &[usize],
        strategy: MergeStrategy,
    ) -> MergeDecision {
        let values: Vec<(usize, &str)> = indices
            .iter()
            .map(|&i| (i, self.batch.value(i, field).trim()))
            .collect();

        let non_empty: Vec<(usize, &str)> = values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .copied()
            .collect();

        if non_empty.is_empty() {
            return MergeDecision {
                field: field.to_string(),
                chosen_value: String::new(),
                source_index: indices[0],
                strategy,
                alternatives: Vec::new(),
            };
        }
        if non_empty.len() == 1 || non_empty.iter().all(|(_, v)| *v == non_empty[0].1) {
            let (index, value) = non_empty[0];
            return MergeDecision {
                field: field.to_string(),
                chosen_value: value.to_string(),
                source_index: index,
                strategy,
                alternatives: Vec::new(),
            };
        }

        let (source_index, chosen_value) = match strategy {
            MergeStrategy::KeepFirst | MergeStrategy::Manual => {
                let (i, v) = non_empty[0];
                (i, v.to_string())
            }
            MergeStrategy::KeepLast => {
                let (i, v) = non_empty[non_empty.len() - 1];
                (i, v.to_string())
            }
            MergeStrategy::KeepLongest => {
                let (i, v) = non_empty
                    .iter()
                    .copied()
                    .max_by_key(|(i, v)| (v.chars().count(), std::cmp::Reverse(*i)))
                    .unwrap_or(non_empty[0]);
                (i, v.to_string())
            }
            MergeStrategy::KeepMostComplete => {
                let (i, v) = non_empty
                    .iter()
                    .copied()
                    .max_by_key(|(i, _)| {
                        let completeness = self
                            .batch
                            .get(*i)
                            .map(Record::non_empty_count)
                            .unwrap_or(0);
                        (completeness, std::cmp::Reverse(*i))
                    })
                    .unwrap_or(non_empty[0]);
                (i, v.to_string())
            }
            MergeStrategy::Concatenate => {
                let mut distinct: Vec<&str> = Vec::new();
                for (_, v) in &non_empty {
                    if !distinct.contains(v) {
                        distinct.push(v);
                    }
                }
                (non_empty[0].0, distinct.join("; "))
            }
        };

        let alternatives = non_empty
            .iter()
            .filter(|(i, v)| *i != source_index && *v != chosen_value)
            .map(|(i, v)| (*i, v.to_string()))
            .collect();

        MergeDecision {
            field: field.to_string(),
            chosen_value,
            source_index,
            strategy,
            alternatives,
        }
    }

    /// Merge one cluster of record indices into a single record.
    ///
    /// An empty index list yields an empty record with confidence 0.0; a
    /// singleton passes through unchanged with confidence 1.0.
    pub fn merge_records(&self, indices: &[usize]) -> MergeResult {
        let mut source_indices = indices.to_vec();
        source_indices.sort_unstable();
        source_indices.dedup();

        if source_indices.is_empty() {
            return MergeResult {
                merged_record: Record::new(),
                source_indices,
                decisions: Vec::new(),
                confidence: 0.0,
            };
        }
        if source_indices.len() == 1 {
            let merged_record = self
                .batch
                .get(source_indices[0])
                .cloned()
                .unwrap_or_default();
            return MergeResult {
                merged_record,
                source_indices,
                decisions: Vec::new(),
                confidence: 1.0,
            };
        }

        let mut merged_record = Record::new();
        let mut decisions = Vec::new();
        let columns = self.batch.columns();

        for field in columns {
            let strategy = self.strategy_for(field);
            let decision = self.resolve_field(field, &source_indices, strategy);
            merged_record.set(field.clone(), decision.chosen_value.clone());
            decisions.push(decision);
        }

        let agreed = decisions
            .iter()
            .filter(|d| d.alternatives.is_empty())
            .count();
        let confidence = if decisions.is_empty() {
            1.0
        } else {
            agreed as f64 / decisions.len() as f64
        };
        debug!(
            members = source_indices.len(),
            conflicts = decisions.len() - agreed,
            "merged cluster"
        );

        MergeResult {
            merged_record,
            source_indices,
            decisions,
            confidence,
        }
    }

    /// Merge every cluster and pass singletons through untouched.
    ///
    /// The output batch partitions the input exactly: each input index
    /// appears in exactly one merged record's sources or as one singleton.
    pub fn bulk_merge(&self, clusters: &[DuplicateCluster]) -> (RecordBatch, Vec<MergeResult>) {
        let results: Vec<MergeResult> = clusters
            .par_iter()
            .map(|cluster| self.merge_records(&cluster.record_indices))
            .collect();

        let clustered: std::collections::HashSet<usize> = clusters
            .iter()
            .flat_map(|c| c.record_indices.iter().copied())
            .collect();

        let mut merged = RecordBatch::new(self.batch.columns().to_vec());
        for result in &results {
            merged.push(result.merged_record.clone());
        }
        for (index, record) in self.batch.records().iter().enumerate() {
            if !clustered.contains(&index) {
                merged.push(record.clone());
            }
        }

        info!(
            input = self.batch.len(),
            clusters = clusters.len(),
            output = merged.len(),
            "bulk merge complete"
        );
        (merged, results)
    }
}
