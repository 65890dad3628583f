//! Duplicate detection: blocking, weighted scoring, and clustering
//!
//! The pipeline is batch and in-memory: candidate pairs come from blocking,
//! get scored in parallel against the configured field weights, and scored
//! pairs are unioned into duplicate clusters.

mod blocking;
mod clustering;
mod scoring;
mod similarity;

pub use blocking::{blocking_key, build_candidate_pairs};
pub use clustering::{cluster_pairs, DuplicateCluster};
pub use scoring::{score_candidates, score_pair, CancelFlag, ScoredPair};
pub use similarity::field_similarity;
pub(crate) use similarity::token_sort_similarity;

use std::collections::HashMap;

use tracing::{debug, info};

use coalesce_domain::{FieldKind, RecordBatch};

use crate::error::ConfigError;

/// Configuration for record matching.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Fields to compare, with their weights
    pub field_weights: HashMap<String, f64>,
    /// Overall score at or above which a pair counts as a duplicate
    pub duplicate_threshold: f64,
    /// Fields used for blocking; records must share a key on at least one
    pub blocking_fields: Vec<String>,
    /// Per-field kinds driving similarity and blocking-key derivation
    pub field_kinds: HashMap<String, FieldKind>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            field_weights: HashMap::from([
                ("email".to_string(), 1.0),
                ("phone".to_string(), 0.8),
                ("first_name".to_string(), 0.5),
                ("last_name".to_string(), 0.6),
                ("company".to_string(), 0.4),
            ]),
            duplicate_threshold: 0.8,
            blocking_fields: vec![
                "email".to_string(),
                "phone".to_string(),
                "last_name".to_string(),
            ],
            field_kinds: HashMap::from([
                ("email".to_string(), FieldKind::Email),
                ("phone".to_string(), FieldKind::Phone),
                ("first_name".to_string(), FieldKind::Name),
                ("last_name".to_string(), FieldKind::Name),
            ]),
        }
    }
}

impl MatchConfig {
    /// Validate the configuration. Called at matcher construction so that
    /// bad config fails fast instead of surfacing mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.duplicate_threshold,
            });
        }
        if self.field_weights.is_empty() {
            return Err(ConfigError::NoMatchFields);
        }
        for (field, &weight) in &self.field_weights {
            if weight < 0.0 || !weight.is_finite() {
                return Err(ConfigError::NegativeWeight {
                    field: field.clone(),
                    weight,
                });
            }
        }
        if self.field_weights.values().all(|&w| w == 0.0) {
            return Err(ConfigError::AllZeroWeights);
        }
        Ok(())
    }
}

/// Detects duplicate records over an immutable batch.
///
/// Clusters are computed once and cached; the batch is never mutated.
pub struct RecordMatcher<'a> {
    batch: &'a RecordBatch,
    config: MatchConfig,
    clusters: Option<Vec<DuplicateCluster>>,
}

impl<'a> RecordMatcher<'a> {
    pub fn new(batch: &'a RecordBatch, config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            batch,
            config,
            clusters: None,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Find all duplicate clusters in the batch.
    pub fn find_duplicates(&mut self) -> &[DuplicateCluster] {
        self.find_duplicates_with(None)
    }

    /// Find duplicates with an optional cancellation flag threaded through
    /// the scoring fan-out.
    pub fn find_duplicates_with(&mut self, cancel: Option<&CancelFlag>) -> &[DuplicateCluster] {
        if self.clusters.is_none() {
            let candidates = build_candidate_pairs(
                self.batch,
                &self.config.blocking_fields,
                &self.config.field_kinds,
            );
            debug!(candidates = candidates.len(), "blocking complete");

            let scored = score_candidates(self.batch, &candidates, &self.config, cancel);
            debug!(scored = scored.len(), "pair scoring complete");

            let clusters = cluster_pairs(&scored, self.batch.len());
            info!(
                records = self.batch.len(),
                candidates = candidates.len(),
                duplicates = scored.len(),
                clusters = clusters.len(),
                "duplicate detection complete"
            );
            self.clusters = Some(clusters);
        }
        self.clusters.as_deref().unwrap_or(&[])
    }

    /// Member indices of a cluster by id, if it exists.
    pub fn cluster_indices(&mut self, cluster_id: usize) -> Option<Vec<usize>> {
        self.find_duplicates()
            .iter()
            .find(|c| c.cluster_id == cluster_id)
            .map(|c| c.record_indices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalesce_domain::Record;

    fn contact(email: &str, phone: &str) -> Record {
        Record::from_pairs(vec![
            ("email".to_string(), email.to_string()),
            ("phone".to_string(), phone.to_string()),
        ])
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = MatchConfig {
            duplicate_threshold: 1.5,
            ..MatchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let config = MatchConfig {
            field_weights: HashMap::from([("email".to_string(), -0.1)]),
            ..MatchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_all_zero_weights() {
        let config = MatchConfig {
            field_weights: HashMap::from([
                ("email".to_string(), 0.0),
                ("phone".to_string(), 0.0),
            ]),
            ..MatchConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::AllZeroWeights));
    }

    #[test]
    fn test_formatting_variant_contacts_cluster() {
        let mut batch = RecordBatch::new(vec!["email".into(), "phone".into()]);
        batch.push(contact("a@x.com", "5551234567"));
        batch.push(contact("a@x.com", "(555) 123-4567"));
        batch.push(contact("other@y.com", "9998887777"));

        let mut matcher = RecordMatcher::new(&batch, MatchConfig::default()).unwrap();
        let clusters = matcher.find_duplicates();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].record_indices, vec![0, 1]);
        assert_eq!(clusters[0].confidence, 1.0);
    }

    #[test]
    fn test_no_blocking_columns_yields_no_clusters() {
        let mut batch = RecordBatch::new(vec!["notes".into()]);
        batch.push(Record::from_pairs(vec![(
            "notes".to_string(),
            "hello".to_string(),
        )]));
        batch.push(Record::from_pairs(vec![(
            "notes".to_string(),
            "hello".to_string(),
        )]));

        let mut matcher = RecordMatcher::new(&batch, MatchConfig::default()).unwrap();
        assert!(matcher.find_duplicates().is_empty());
    }
}
