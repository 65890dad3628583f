//! Street address normalization

use lazy_static::lazy_static;
use regex::Regex;

use super::collapse_whitespace;

const STREET_TYPES: &[(&str, &str)] = &[
    ("avenue", "Ave"),
    ("ave", "Ave"),
    ("boulevard", "Blvd"),
    ("blvd", "Blvd"),
    ("circle", "Cir"),
    ("cir", "Cir"),
    ("court", "Ct"),
    ("ct", "Ct"),
    ("drive", "Dr"),
    ("dr", "Dr"),
    ("highway", "Hwy"),
    ("hwy", "Hwy"),
    ("lane", "Ln"),
    ("ln", "Ln"),
    ("parkway", "Pkwy"),
    ("pkwy", "Pkwy"),
    ("place", "Pl"),
    ("pl", "Pl"),
    ("road", "Rd"),
    ("rd", "Rd"),
    ("street", "St"),
    ("st", "St"),
    ("terrace", "Ter"),
    ("ter", "Ter"),
    ("trail", "Trl"),
    ("trl", "Trl"),
    ("way", "Way"),
];

const DIRECTIONS: &[(&str, &str)] = &[
    ("northeast", "NE"),
    ("northwest", "NW"),
    ("southeast", "SE"),
    ("southwest", "SW"),
    ("north", "N"),
    ("south", "S"),
    ("east", "E"),
    ("west", "W"),
    ("ne", "NE"),
    ("nw", "NW"),
    ("se", "SE"),
    ("sw", "SW"),
    ("n", "N"),
    ("s", "S"),
    ("e", "E"),
    ("w", "W"),
];

const US_STATES: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("new jersey", "NJ"),
    ("new mexico", "NM"),
    ("new york", "NY"),
    ("north carolina", "NC"),
    ("north dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("south dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
    ("district of columbia", "DC"),
];

lazy_static! {
    static ref APT_PATTERN: Regex = Regex::new(r"(?i)\b(apt|apartment)\.?\s*#?\s*").unwrap();
    static ref SUITE_PATTERN: Regex = Regex::new(r"(?i)\b(ste|suite)\.?\s*#?\s*").unwrap();
    static ref UNIT_PATTERN: Regex = Regex::new(r"(?i)\b(unit)\.?\s*#?\s*").unwrap();
}

/// Normalize a street address: standardize street-type and directional
/// abbreviations, unit designators, and whitespace.
pub fn normalize_address(address: &str) -> String {
    let address = address.trim();
    if address.is_empty() {
        return String::new();
    }

    let mut result = if address.chars().all(|c| !c.is_lowercase()) {
        title_case_words(address)
    } else {
        address.to_string()
    };

    result = replace_word_table(&result, STREET_TYPES);
    result = replace_word_table(&result, DIRECTIONS);

    result = APT_PATTERN.replace_all(&result, "Apt ").into_owned();
    result = SUITE_PATTERN.replace_all(&result, "Suite ").into_owned();
    result = UNIT_PATTERN.replace_all(&result, "Unit ").into_owned();

    collapse_whitespace(&result).trim().to_string()
}

/// Normalize a US state name or abbreviation to the two-letter code.
/// Unrecognized input is returned trimmed and uppercased when it already
/// looks like a code, otherwise unchanged.
pub fn normalize_state(state: &str) -> String {
    let trimmed = state.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_lowercase();
    if let Some((_, abbrev)) = US_STATES.iter().find(|(name, _)| *name == lower) {
        return abbrev.to_string();
    }
    if trimmed.len() == 2 && US_STATES.iter().any(|(_, a)| a.eq_ignore_ascii_case(trimmed)) {
        return trimmed.to_uppercase();
    }

    trimmed.to_string()
}

fn title_case_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn replace_word_table(s: &str, table: &[(&str, &str)]) -> String {
    s.split_whitespace()
        .map(|word| {
            let stripped = word.trim_end_matches('.');
            match table
                .iter()
                .find(|(full, _)| full.eq_ignore_ascii_case(stripped))
            {
                Some((_, abbrev)) => abbrev.to_string(),
                None => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address_street_types() {
        assert_eq!(normalize_address("123 Main Street"), "123 Main St");
        assert_eq!(normalize_address("456 Oak Avenue"), "456 Oak Ave");
        assert_eq!(normalize_address("789 Pine Blvd."), "789 Pine Blvd");
    }

    #[test]
    fn test_normalize_address_directions() {
        assert_eq!(normalize_address("100 North Main St"), "100 N Main St");
        assert_eq!(normalize_address("200 SW Park Ave"), "200 SW Park Ave");
    }

    #[test]
    fn test_normalize_address_units() {
        assert_eq!(
            normalize_address("123 Main St Apt. #4"),
            "123 Main St Apt 4"
        );
        assert_eq!(
            normalize_address("123 Main St suite 200"),
            "123 Main St Suite 200"
        );
    }

    #[test]
    fn test_normalize_address_all_caps() {
        assert_eq!(normalize_address("123 MAIN STREET"), "123 Main St");
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state("California"), "CA");
        assert_eq!(normalize_state("ca"), "CA");
        assert_eq!(normalize_state("New York"), "NY");
        assert_eq!(normalize_state("Ontario"), "Ontario");
        assert_eq!(normalize_state(""), "");
    }
}
