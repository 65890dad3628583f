//! Field-level similarity scoring

use coalesce_domain::FieldKind;
use strsim::{jaro_winkler, normalized_levenshtein};

use crate::normalize::{comparison_key, digits_only};

/// Similarity between two field values in [0, 1], using a comparator chosen
/// by the field kind.
///
/// Both-empty input is the caller's skip case; this function treats it as a
/// trivial exact match. Exactly one empty side scores 0.0 for every kind.
pub fn field_similarity(a: &str, b: &str, kind: FieldKind) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return if a == b { 1.0 } else { 0.0 };
    }

    // Exact case-insensitive match wins regardless of kind
    if a == b {
        return 1.0;
    }

    match kind {
        // Near-miss emails are different people
        FieldKind::Email => 0.0,
        FieldKind::Phone => phone_similarity(&a, &b),
        FieldKind::Text | FieldKind::Name => token_sort_similarity(&a, &b),
    }
}

/// Compare phone numbers on digits alone: equal digits are an exact match,
/// a shared suffix/prefix (country-code or formatting variance) scores 0.9,
/// anything else falls back to edit similarity over the digit strings.
fn phone_similarity(a: &str, b: &str) -> f64 {
    let digits_a = digits_only(a);
    let digits_b = digits_only(b);

    if digits_a.is_empty() || digits_b.is_empty() {
        return 0.0;
    }
    if digits_a == digits_b {
        return 1.0;
    }
    if digits_a.ends_with(&digits_b)
        || digits_b.ends_with(&digits_a)
        || digits_a.starts_with(&digits_b)
        || digits_b.starts_with(&digits_a)
    {
        return 0.9;
    }

    normalized_levenshtein(&digits_a, &digits_b)
}

/// Token-order-insensitive string similarity: fold each side to an ASCII
/// comparison key, sort whitespace tokens, then combine Jaro-Winkler and
/// normalized Levenshtein on the rejoined strings. "José García" and
/// "Garcia, Jose" compare as near-identical.
pub(crate) fn token_sort_similarity(a: &str, b: &str) -> f64 {
    let sorted_a = sort_tokens(&comparison_key(a));
    let sorted_b = sort_tokens(&comparison_key(b));

    if sorted_a.is_empty() || sorted_b.is_empty() {
        return 0.0;
    }

    let jw = jaro_winkler(&sorted_a, &sorted_b);
    let lev = normalized_levenshtein(&sorted_a, &sorted_b);

    jw * 0.6 + lev * 0.4
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_any_kind() {
        assert_eq!(field_similarity("A@X.com", "a@x.com", FieldKind::Email), 1.0);
        assert_eq!(field_similarity("Smith", "smith", FieldKind::Name), 1.0);
        assert_eq!(field_similarity(" 555 ", "555", FieldKind::Phone), 1.0);
    }

    #[test]
    fn test_email_is_all_or_nothing() {
        assert_eq!(
            field_similarity("john@x.com", "jon@x.com", FieldKind::Email),
            0.0
        );
    }

    #[test]
    fn test_phone_digit_equality_ignores_formatting() {
        assert_eq!(
            field_similarity("(555) 123-4567", "555.123.4567", FieldKind::Phone),
            1.0
        );
    }

    #[test]
    fn test_phone_country_code_variance_scores_high() {
        let score = field_similarity("+1 555 123 4567", "5551234567", FieldKind::Phone);
        assert_eq!(score, 0.9);
    }

    #[test]
    fn test_phone_fallback_edit_similarity() {
        let score = field_similarity("5551234567", "5551234568", FieldKind::Phone);
        assert!(score > 0.8 && score < 1.0);
    }

    #[test]
    fn test_token_order_insensitive() {
        let forward = field_similarity("Acme Widgets Inc", "Inc Acme Widgets", FieldKind::Text);
        assert!(forward > 0.99, "token order should not matter, got {forward}");
    }

    #[test]
    fn test_diacritics_and_punctuation_fold_for_names() {
        let score = field_similarity("José García", "Garcia, Jose", FieldKind::Name);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_one_sided_empty_scores_zero() {
        assert_eq!(field_similarity("", "x", FieldKind::Text), 0.0);
        assert_eq!(field_similarity("x", "  ", FieldKind::Phone), 0.0);
    }

    #[test]
    fn test_dissimilar_text_scores_low() {
        let score = field_similarity("Acme Corp", "Globex Industries", FieldKind::Text);
        assert!(score < 0.6, "got {score}");
    }
}
