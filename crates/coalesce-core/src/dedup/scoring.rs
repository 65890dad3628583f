//! Weighted pairwise record scoring

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use coalesce_domain::{Record, RecordBatch};

use super::similarity::field_similarity;
use super::MatchConfig;

/// Cooperative cancellation flag for the scoring fan-out.
///
/// Cancelling does not corrupt anything: pairs already scored are returned,
/// the rest are simply never compared.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A candidate pair that scored at or above the duplicate threshold.
#[derive(Clone, Debug, Serialize)]
pub struct ScoredPair {
    /// Lower record index of the pair
    pub left: usize,
    /// Higher record index of the pair
    pub right: usize,
    /// Weighted overall similarity in [0, 1]
    pub score: f64,
    /// Per-field similarity for every field that consumed weight
    pub field_scores: HashMap<String, f64>,
}

/// Score one record pair across the configured match fields.
///
/// A field is skipped (consumes no weight) only when both values are empty;
/// a one-sided empty value scores 0.0 and still consumes its weight. The
/// overall score is the weighted mean of the contributing fields, or 0.0 if
/// nothing contributed.
pub fn score_pair(
    left: &Record,
    right: &Record,
    config: &MatchConfig,
) -> (f64, HashMap<String, f64>) {
    let mut field_scores = HashMap::new();
    let mut total_weight = 0.0;
    let mut weighted_score = 0.0;

    for (field, weight) in &config.field_weights {
        let value_left = left.value(field).trim();
        let value_right = right.value(field).trim();

        if value_left.is_empty() && value_right.is_empty() {
            continue;
        }

        let kind = config.field_kinds.get(field).copied().unwrap_or_default();
        let similarity = field_similarity(value_left, value_right, kind);

        field_scores.insert(field.clone(), similarity);
        weighted_score += similarity * weight;
        total_weight += weight;
    }

    let overall = if total_weight > 0.0 {
        weighted_score / total_weight
    } else {
        0.0
    };

    (overall, field_scores)
}

/// Score all candidate pairs in parallel, keeping those at or above the
/// duplicate threshold. Results come back in (left, right) order regardless
/// of scheduling.
pub fn score_candidates(
    batch: &RecordBatch,
    candidates: &BTreeSet<(usize, usize)>,
    config: &MatchConfig,
    cancel: Option<&CancelFlag>,
) -> Vec<ScoredPair> {
    let pairs: Vec<(usize, usize)> = candidates.iter().copied().collect();

    let mut scored: Vec<ScoredPair> = pairs
        .par_iter()
        .filter_map(|&(left, right)| {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                return None;
            }
            let record_left = batch.get(left)?;
            let record_right = batch.get(right)?;

            let (score, field_scores) = score_pair(record_left, record_right, config);
            if score >= config.duplicate_threshold {
                Some(ScoredPair {
                    left,
                    right,
                    score,
                    field_scores,
                })
            } else {
                None
            }
        })
        .collect();

    scored.sort_by_key(|p| (p.left, p.right));
    scored
}
