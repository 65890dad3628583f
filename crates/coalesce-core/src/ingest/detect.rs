//! Value-based column type detection
//!
//! Header matching says what a column is called; this module looks at what
//! the column holds. Each sampled value is classified into exactly one type,
//! and a type wins the column when it covers at least half of the sample.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use coalesce_domain::{FieldKind, RecordBatch};

use crate::normalize::{is_valid_email, is_valid_phone};

const VOTE_THRESHOLD: f64 = 0.5;
const MAX_SAMPLE_ROWS: usize = 100;
const MAX_SAMPLE_VALUES: usize = 5;

lazy_static! {
    static ref PHONE_CHARS: Regex = Regex::new(r"^[\d\s().+\-]+$").unwrap();
    static ref URL_VALUE: Regex = Regex::new(r"^https?://[\w.-]+").unwrap();
    static ref INTEGER_VALUE: Regex = Regex::new(r"^-?\d+$").unwrap();
    static ref FLOAT_VALUE: Regex = Regex::new(r"^-?\d+\.\d+$").unwrap();
    static ref DATE_VALUE: Regex = Regex::new(
        r"^(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4}|\d{1,2}-\d{1,2}-\d{2,4})$"
    )
    .unwrap();
}

const BOOLEAN_WORDS: &[&str] = &[
    "true", "false", "yes", "no", "y", "n", "1", "0", "on", "off", "enabled", "disabled",
];

/// Detected content type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Email,
    Phone,
    Date,
    Boolean,
    Url,
    /// No non-empty values observed
    Empty,
}

impl ColumnType {
    /// Field kind to use for similarity on a column of this type.
    pub fn field_kind(self) -> FieldKind {
        match self {
            ColumnType::Email => FieldKind::Email,
            ColumnType::Phone => FieldKind::Phone,
            _ => FieldKind::Text,
        }
    }
}

/// Classify a single value. Exactly one type per value; earlier checks win.
/// Dates are checked before phones so that "2024-01-15" does not read as a
/// dash-formatted phone number.
fn classify(value: &str) -> ColumnType {
    if is_valid_email(value) {
        ColumnType::Email
    } else if URL_VALUE.is_match(value) {
        ColumnType::Url
    } else if DATE_VALUE.is_match(value) {
        ColumnType::Date
    } else if PHONE_CHARS.is_match(value) && is_valid_phone(value) {
        ColumnType::Phone
    } else if BOOLEAN_WORDS.contains(&value.to_lowercase().as_str()) {
        ColumnType::Boolean
    } else if INTEGER_VALUE.is_match(value) {
        ColumnType::Integer
    } else if FLOAT_VALUE.is_match(value) {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

/// Per-column profile gathered in one pass over the batch.
#[derive(Clone, Debug, Serialize)]
pub struct ColumnProfile {
    pub column: String,
    pub column_type: ColumnType,
    /// Rows with an empty value
    pub null_count: usize,
    /// Fraction of rows with a non-empty value
    pub fill_rate: f64,
    /// Distinct non-empty values
    pub unique_count: usize,
    /// Up to five example values, in row order
    pub samples: Vec<String>,
}

/// Profiles the columns of a record batch.
#[derive(Default)]
pub struct SchemaDetector;

impl SchemaDetector {
    pub fn new() -> Self {
        Self
    }

    /// Profile one column.
    pub fn profile_column(&self, batch: &RecordBatch, column: &str) -> ColumnProfile {
        let mut non_empty = 0usize;
        let mut votes: Vec<(ColumnType, usize)> = Vec::new();
        let mut unique: HashSet<String> = HashSet::new();
        let mut samples: Vec<String> = Vec::new();

        for record in batch.records() {
            let value = record.value(column).trim();
            if value.is_empty() {
                continue;
            }
            non_empty += 1;
            unique.insert(value.to_string());
            if samples.len() < MAX_SAMPLE_VALUES {
                samples.push(value.to_string());
            }
            // Classification is sampled; statistics are not
            if non_empty <= MAX_SAMPLE_ROWS {
                let column_type = classify(value);
                match votes.iter_mut().find(|(t, _)| *t == column_type) {
                    Some((_, count)) => *count += 1,
                    None => votes.push((column_type, 1)),
                }
            }
        }

        let column_type = if non_empty == 0 {
            ColumnType::Empty
        } else {
            let sampled = non_empty.min(MAX_SAMPLE_ROWS);
            votes
                .iter()
                .max_by_key(|(_, count)| *count)
                .filter(|(_, count)| *count as f64 / sampled as f64 >= VOTE_THRESHOLD)
                .map(|(t, _)| *t)
                .unwrap_or(ColumnType::Text)
        };

        let fill_rate = if batch.is_empty() {
            0.0
        } else {
            non_empty as f64 / batch.len() as f64
        };

        ColumnProfile {
            column: column.to_string(),
            column_type,
            null_count: batch.len() - non_empty,
            fill_rate,
            unique_count: unique.len(),
            samples,
        }
    }

    /// Profile every column of the batch, in column order.
    pub fn profile(&self, batch: &RecordBatch) -> Vec<ColumnProfile> {
        batch
            .columns()
            .iter()
            .map(|c| self.profile_column(batch, c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalesce_domain::Record;

    fn single_column(name: &str, values: &[&str]) -> RecordBatch {
        let mut batch = RecordBatch::new(vec![name.to_string()]);
        for value in values {
            batch.push(Record::from_pairs(vec![(
                name.to_string(),
                value.to_string(),
            )]));
        }
        batch
    }

    fn detect(values: &[&str]) -> ColumnType {
        let batch = single_column("c", values);
        SchemaDetector::new().profile_column(&batch, "c").column_type
    }

    #[test]
    fn test_detect_email_column() {
        assert_eq!(
            detect(&["a@x.com", "b@y.org", "not an email"]),
            ColumnType::Email
        );
    }

    #[test]
    fn test_detect_phone_column() {
        assert_eq!(
            detect(&["(555) 123-4567", "+44 20 7946 0958"]),
            ColumnType::Phone
        );
    }

    #[test]
    fn test_detect_url_and_boolean() {
        assert_eq!(detect(&["https://x.com/a", "http://y.org"]), ColumnType::Url);
        assert_eq!(detect(&["yes", "No", "YES"]), ColumnType::Boolean);
    }

    #[test]
    fn test_detect_numeric_columns() {
        assert_eq!(detect(&["42", "-17"]), ColumnType::Integer);
        assert_eq!(detect(&["3.25", "-0.5"]), ColumnType::Float);
    }

    #[test]
    fn test_detect_date_column() {
        assert_eq!(detect(&["2024-01-15", "3/7/2023", ""]), ColumnType::Date);
    }

    #[test]
    fn test_below_majority_falls_back_to_text() {
        assert_eq!(detect(&["a@x.com", "hello", "world"]), ColumnType::Text);
    }

    #[test]
    fn test_empty_column() {
        assert_eq!(detect(&["", "  "]), ColumnType::Empty);
    }

    #[test]
    fn test_fill_rate_uniques_and_samples() {
        let batch = single_column("c", &["x", "x", "", "y"]);
        let profile = SchemaDetector::new().profile_column(&batch, "c");
        assert!((profile.fill_rate - 0.75).abs() < 1e-9);
        assert_eq!(profile.null_count, 1);
        assert_eq!(profile.unique_count, 2);
        // First five non-empty values in row order, duplicates included
        assert_eq!(profile.samples, vec!["x", "x", "y"]);
    }
}
