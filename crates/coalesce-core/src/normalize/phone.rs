//! Phone number normalization
//!
//! Digit-based handling tuned for NANP numbers: a 10-digit number gets the
//! +1 country code, an 11-digit number starting with 1 is accepted as-is.

/// Strip everything but ASCII digits.
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a phone number to an E.164-style string.
///
/// Returns `None` when the digit count falls outside the plausible 7–15
/// range. Numbers without a recognizable country code are returned with a
/// bare `+` prefix rather than guessed at.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits = digits_only(phone);
    if !(7..=15).contains(&digits.len()) {
        return None;
    }

    if digits.len() == 10 {
        return Some(format!("+1{digits}"));
    }
    if digits.len() == 11 && digits.starts_with('1') {
        return Some(format!("+{digits}"));
    }

    Some(format!("+{digits}"))
}

/// Plausibility check: 7 to 15 digits after stripping formatting.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = digits_only(phone);
    (7..=15).contains(&digits.len())
}
