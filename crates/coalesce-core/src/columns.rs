//! Column header matching against the canonical schema
//!
//! Maps arbitrary source column labels onto canonical names using exact,
//! alias, and fuzzy matching, in that order. The alias index is built once
//! at construction and never mutated.

use std::collections::HashMap;

use serde::Serialize;

use coalesce_domain::CanonicalSchema;

use crate::dedup::token_sort_similarity;
use crate::error::ConfigError;
use crate::ingest::normalize_header;

/// Default confidence threshold for auto-matching
pub const DEFAULT_COLUMN_THRESHOLD: f64 = 0.7;

/// How a source column was matched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Alias,
    Fuzzy,
    None,
}

/// Result of matching one source column to the canonical schema
#[derive(Clone, Debug, Serialize)]
pub struct ColumnMatch {
    pub source_column: String,
    pub canonical_column: Option<String>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub kind: MatchKind,
    /// Other plausible canonical targets, best first (at most 3)
    pub alternatives: Vec<(String, f64)>,
}

/// Matches source column labels to a canonical schema.
pub struct ColumnMatcher {
    /// Lowercased canonical names, in schema order
    canonical_columns: Vec<String>,
    /// Lowercased alias (and canonical name) -> canonical owner
    alias_map: HashMap<String, String>,
    /// Fuzzy targets in deterministic first-seen order
    targets: Vec<String>,
}

impl ColumnMatcher {
    /// Build the matcher from a schema. Fails fast on an empty vocabulary.
    pub fn new(schema: &CanonicalSchema) -> Result<Self, ConfigError> {
        if schema.columns.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }

        let canonical_columns: Vec<String> = schema
            .columns
            .iter()
            .map(|c| c.name.to_lowercase())
            .collect();

        let alias_map = schema.alias_map();

        // Canonical names first, then aliases, both in schema order, so
        // fuzzy ties break toward earlier-declared columns
        let mut targets = canonical_columns.clone();
        for column in &schema.columns {
            for alias in &column.aliases {
                targets.push(alias.to_lowercase());
            }
        }

        Ok(Self {
            canonical_columns,
            alias_map,
            targets,
        })
    }

    /// Match a single source label. The label is header-normalized first,
    /// so "Phone Number" and "phone_number" are the same label. First hit
    /// wins: exact canonical name, then alias, then best fuzzy target above
    /// the threshold.
    pub fn match_column(&self, source_column: &str, threshold: f64) -> ColumnMatch {
        let normalized = normalize_header(source_column);

        if self.canonical_columns.contains(&normalized) {
            return ColumnMatch {
                source_column: source_column.to_string(),
                canonical_column: Some(normalized),
                confidence: 1.0,
                kind: MatchKind::Exact,
                alternatives: Vec::new(),
            };
        }

        if let Some(canonical) = self.alias_map.get(&normalized) {
            return ColumnMatch {
                source_column: source_column.to_string(),
                canonical_column: Some(canonical.clone()),
                confidence: 1.0,
                kind: MatchKind::Alias,
                alternatives: Vec::new(),
            };
        }

        self.fuzzy_match(source_column, &normalized, threshold)
    }

    fn fuzzy_match(&self, source_column: &str, normalized: &str, threshold: f64) -> ColumnMatch {
        // Rank every target; stable sort keeps first-seen order on ties
        let mut ranked: Vec<(&str, f64)> = self
            .targets
            .iter()
            .map(|t| (t.as_str(), token_sort_similarity(normalized, t)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let Some(&(best_target, best_score)) = ranked.first() else {
            return ColumnMatch {
                source_column: source_column.to_string(),
                canonical_column: None,
                confidence: 0.0,
                kind: MatchKind::None,
                alternatives: Vec::new(),
            };
        };

        let canonical = self
            .alias_map
            .get(best_target)
            .cloned()
            .unwrap_or_else(|| best_target.to_string());

        // Collect further alternatives with distinct canonical owners
        let mut alternatives: Vec<(String, f64)> = Vec::new();
        let mut seen = vec![canonical.clone()];
        for (target, score) in ranked.iter().skip(1) {
            let owner = self
                .alias_map
                .get(*target)
                .cloned()
                .unwrap_or_else(|| target.to_string());
            if !seen.contains(&owner) {
                seen.push(owner.clone());
                alternatives.push((owner, *score));
            }
            if alternatives.len() >= 2 {
                break;
            }
        }

        if best_score >= threshold {
            ColumnMatch {
                source_column: source_column.to_string(),
                canonical_column: Some(canonical),
                confidence: best_score,
                kind: MatchKind::Fuzzy,
                alternatives,
            }
        } else {
            // Below threshold: no match, but surface the best guess first
            let mut all_alternatives = vec![(canonical, best_score)];
            all_alternatives.extend(alternatives.into_iter().take(2));
            ColumnMatch {
                source_column: source_column.to_string(),
                canonical_column: None,
                confidence: best_score,
                kind: MatchKind::None,
                alternatives: all_alternatives,
            }
        }
    }

    /// Match every label independently; order has no effect on results.
    pub fn match_all(&self, source_columns: &[String], threshold: f64) -> Vec<ColumnMatch> {
        source_columns
            .iter()
            .map(|c| self.match_column(c, threshold))
            .collect()
    }

    /// Reduce matches to a source -> canonical (or None) mapping.
    pub fn get_mapping(
        &self,
        source_columns: &[String],
        threshold: f64,
    ) -> HashMap<String, Option<String>> {
        self.match_all(source_columns, threshold)
            .into_iter()
            .map(|m| (m.source_column.clone(), m.canonical_column))
            .collect()
    }

    /// Columns that resolved to nothing above the threshold.
    pub fn get_unmatched(&self, source_columns: &[String], threshold: f64) -> Vec<ColumnMatch> {
        self.match_all(source_columns, threshold)
            .into_iter()
            .filter(|m| m.canonical_column.is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalesce_domain::{default_contact_schema, CanonicalSchema};

    fn matcher() -> ColumnMatcher {
        ColumnMatcher::new(&default_contact_schema()).unwrap()
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let schema = CanonicalSchema {
            name: "empty".to_string(),
            version: "1.0".to_string(),
            description: String::new(),
            columns: Vec::new(),
        };
        assert!(matches!(
            ColumnMatcher::new(&schema),
            Err(ConfigError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_exact_match() {
        let m = matcher().match_column("email", DEFAULT_COLUMN_THRESHOLD);
        assert_eq!(m.canonical_column.as_deref(), Some("email"));
        assert_eq!(m.kind, MatchKind::Exact);
        assert_eq!(m.confidence, 1.0);
        assert!(m.alternatives.is_empty());
    }

    #[test]
    fn test_alias_match_is_case_insensitive() {
        let matcher = matcher();
        let upper = matcher.match_column("FIRSTNAME", DEFAULT_COLUMN_THRESHOLD);
        let lower = matcher.match_column("firstname", DEFAULT_COLUMN_THRESHOLD);

        assert_eq!(upper.canonical_column.as_deref(), Some("first_name"));
        assert_eq!(upper.kind, MatchKind::Alias);
        assert_eq!(upper.canonical_column, lower.canonical_column);
        assert_eq!(upper.confidence, lower.confidence);
        assert_eq!(upper.kind, lower.kind);
    }

    #[test]
    fn test_fuzzy_match_maps_alias_to_owner() {
        let m = matcher().match_column("e-mail address", DEFAULT_COLUMN_THRESHOLD);
        assert_eq!(m.canonical_column.as_deref(), Some("email"));
        assert_eq!(m.kind, MatchKind::Fuzzy);
        assert!(m.confidence >= DEFAULT_COLUMN_THRESHOLD);
    }

    #[test]
    fn test_alternatives_have_distinct_owners() {
        let m = matcher().match_column("phone num", DEFAULT_COLUMN_THRESHOLD);
        let mut owners: Vec<&str> = m.alternatives.iter().map(|(o, _)| o.as_str()).collect();
        if let Some(canonical) = &m.canonical_column {
            owners.push(canonical);
        }
        let before = owners.len();
        owners.sort_unstable();
        owners.dedup();
        assert_eq!(owners.len(), before, "alternatives repeat a canonical owner");
        assert!(m.alternatives.len() <= 3);
    }

    #[test]
    fn test_no_match_surfaces_best_guess() {
        let m = matcher().match_column("xzqy_gibberish", DEFAULT_COLUMN_THRESHOLD);
        assert_eq!(m.canonical_column, None);
        assert_eq!(m.kind, MatchKind::None);
        assert!(!m.alternatives.is_empty(), "best guess should be surfaced");
        assert!(m.alternatives[0].1 < DEFAULT_COLUMN_THRESHOLD);
    }

    #[test]
    fn test_get_mapping() {
        let matcher = matcher();
        let columns = vec![
            "Email".to_string(),
            "surname".to_string(),
            "xzqy".to_string(),
        ];
        let mapping = matcher.get_mapping(&columns, DEFAULT_COLUMN_THRESHOLD);
        assert_eq!(
            mapping.get("Email").and_then(|m| m.as_deref()),
            Some("email")
        );
        assert_eq!(
            mapping.get("surname").and_then(|m| m.as_deref()),
            Some("last_name")
        );
        assert_eq!(mapping.get("xzqy"), Some(&None));
    }

    #[test]
    fn test_get_unmatched() {
        let matcher = matcher();
        let columns = vec!["email".to_string(), "xzqy".to_string()];
        let unmatched = matcher.get_unmatched(&columns, DEFAULT_COLUMN_THRESHOLD);
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].source_column, "xzqy");
    }
}
