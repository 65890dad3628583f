//! Blocking: candidate pair generation
//!
//! Records are only compared when they share a blocking key on at least one
//! configured field. This trades recall (duplicates that disagree on every
//! blocking field are never compared) for tractable cost — a documented
//! limitation, not a bug.

use std::collections::{BTreeSet, HashMap};

use coalesce_domain::{FieldKind, RecordBatch};

use crate::normalize::digits_only;

/// Derive the blocking key for a value of the given kind.
///
/// Returns `None` for values that yield no usable key; such records join no
/// block for that field.
pub fn blocking_key(value: &str, kind: FieldKind) -> Option<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    let key = match kind {
        // First characters of the local part, so formatting-variant
        // duplicates still collide
        FieldKind::Email => match value.split_once('@') {
            Some((local, _)) => prefix_chars(local, 4),
            None => prefix_chars(&value, 4),
        },
        // Last 4 digits survive country-code and formatting differences
        FieldKind::Phone => {
            let digits = digits_only(&value);
            if digits.is_empty() {
                return None;
            }
            let start = digits.len().saturating_sub(4);
            digits[start..].to_string()
        }
        FieldKind::Name => prefix_chars(&value, 3),
        FieldKind::Text => prefix_chars(&value, 5),
    };

    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

fn prefix_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Group record indices by blocking key for one field.
fn create_blocks(
    batch: &RecordBatch,
    field: &str,
    kind: FieldKind,
) -> HashMap<String, Vec<usize>> {
    let mut blocks: HashMap<String, Vec<usize>> = HashMap::new();

    for (index, record) in batch.records().iter().enumerate() {
        if let Some(key) = blocking_key(record.value(field), kind) {
            blocks.entry(key).or_default().push(index);
        }
    }

    blocks
}

/// Generate candidate pairs across all blocking fields.
///
/// Every unordered (min, max) pair sharing a block on any field is emitted
/// exactly once. Fields absent from the batch are skipped silently.
pub fn build_candidate_pairs(
    batch: &RecordBatch,
    blocking_fields: &[String],
    field_kinds: &HashMap<String, FieldKind>,
) -> BTreeSet<(usize, usize)> {
    let mut candidates = BTreeSet::new();

    for field in blocking_fields {
        if !batch.has_column(field) {
            continue;
        }
        let kind = field_kinds.get(field).copied().unwrap_or_default();
        let blocks = create_blocks(batch, field, kind);

        for indices in blocks.values() {
            if indices.len() < 2 {
                continue;
            }
            for i in 0..indices.len() {
                for j in (i + 1)..indices.len() {
                    let pair = (
                        indices[i].min(indices[j]),
                        indices[i].max(indices[j]),
                    );
                    candidates.insert(pair);
                }
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalesce_domain::Record;

    fn batch(rows: &[&[(&str, &str)]]) -> RecordBatch {
        let columns = rows
            .first()
            .map(|r| r.iter().map(|(n, _)| n.to_string()).collect())
            .unwrap_or_default();
        let mut batch = RecordBatch::new(columns);
        for row in rows {
            batch.push(Record::from_pairs(
                row.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect(),
            ));
        }
        batch
    }

    #[test]
    fn test_blocking_key_email_uses_local_part() {
        assert_eq!(
            blocking_key("John.Doe@example.com", FieldKind::Email),
            Some("john".to_string())
        );
        assert_eq!(blocking_key("jd@x.com", FieldKind::Email), Some("jd".to_string()));
    }

    #[test]
    fn test_blocking_key_phone_last_four() {
        assert_eq!(
            blocking_key("(555) 123-4567", FieldKind::Phone),
            Some("4567".to_string())
        );
        assert_eq!(blocking_key("123", FieldKind::Phone), Some("123".to_string()));
        assert_eq!(blocking_key("ext", FieldKind::Phone), None);
    }

    #[test]
    fn test_blocking_key_empty_value() {
        assert_eq!(blocking_key("   ", FieldKind::Text), None);
    }

    #[test]
    fn test_candidates_within_shared_block() {
        let batch = batch(&[
            &[("phone", "555-123-4567")],
            &[("phone", "(555) 123 4567")],
            &[("phone", "999-888-0000")],
        ]);
        let kinds = HashMap::from([("phone".to_string(), FieldKind::Phone)]);
        let pairs =
            build_candidate_pairs(&batch, &["phone".to_string()], &kinds);
        assert_eq!(pairs, BTreeSet::from([(0, 1)]));
    }

    #[test]
    fn test_missing_blocking_column_is_skipped() {
        let batch = batch(&[&[("email", "a@x.com")], &[("email", "a@x.com")]]);
        let kinds = HashMap::new();
        let pairs = build_candidate_pairs(&batch, &["phone".to_string()], &kinds);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_union_across_fields_dedupes_pairs() {
        let batch = batch(&[
            &[("email", "ann@x.com"), ("last_name", "Smith")],
            &[("email", "ann@y.com"), ("last_name", "Smithson")],
        ]);
        let kinds = HashMap::from([
            ("email".to_string(), FieldKind::Email),
            ("last_name".to_string(), FieldKind::Name),
        ]);
        let pairs = build_candidate_pairs(
            &batch,
            &["email".to_string(), "last_name".to_string()],
            &kinds,
        );
        // Found via both email local-part and surname prefix, emitted once
        assert_eq!(pairs, BTreeSet::from([(0, 1)]));
    }
}
