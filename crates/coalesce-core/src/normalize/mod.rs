//! Field normalization helpers
//!
//! Pure string-in, string-out cleanup for the contact field kinds. These
//! never error: invalid input yields `None` (validating normalizers) or the
//! cleaned-up original.

mod address;
mod email;
mod name;
mod phone;

pub use address::{normalize_address, normalize_state};
pub use email::{extract_domain, is_valid_email, normalize_email, normalize_email_strict, EmailParts};
pub use name::{combine_name, normalize_name, parse_full_name, ParsedName};
pub use phone::{digits_only, is_valid_phone, normalize_phone};

use coalesce_domain::{CanonicalSchema, FieldKind, RecordBatch};

/// Normalize every schema-known column of a batch in place.
///
/// Emails and phones that fail validation are left as entered rather than
/// blanked; dirty data is still data. Address and state columns get their
/// dedicated normalizers, other text columns are left alone.
pub fn normalize_batch(batch: &mut RecordBatch, schema: &CanonicalSchema) {
    let columns: Vec<String> = batch.columns().to_vec();
    for column in &columns {
        let Some(kind) = schema.column(column).map(|c| c.kind) else {
            continue;
        };
        for index in 0..batch.len() {
            let value = batch.value(index, column).trim().to_string();
            if value.is_empty() {
                continue;
            }
            let normalized = match kind {
                FieldKind::Email => normalize_email(&value).unwrap_or(value),
                FieldKind::Phone => normalize_phone(&value).unwrap_or(value),
                FieldKind::Name => normalize_name(&value),
                FieldKind::Text => match column.as_str() {
                    "address" => normalize_address(&value),
                    "state" => normalize_state(&value),
                    _ => value,
                },
            };
            if let Some(record) = batch.get_mut(index) {
                record.set(column.clone(), normalized);
            }
        }
    }
}

/// Collapse runs of whitespace into single spaces.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c);
            prev_was_space = false;
        }
    }

    result
}

/// Fold a string to a lowercase ASCII comparison key: NFKD-decompose,
/// drop combining marks and punctuation, collapse whitespace.
pub(crate) fn comparison_key(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;

    let filtered: String = s
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect();

    collapse_whitespace(&filtered.to_lowercase())
        .trim()
        .to_string()
}
