//! Person name parsing and normalization

use lazy_static::lazy_static;
use regex::Regex;

/// Parsed name components
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

const PREFIXES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "rev", "hon", "sir", "dame",
];

const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "v", "phd", "ph.d", "md", "m.d", "esq", "cpa", "dds", "dvm",
];

lazy_static! {
    static ref MC_PATTERN: Regex = Regex::new(r"\bMc([a-z])").unwrap();
    static ref MAC_PATTERN: Regex = Regex::new(r"\bMac([a-z])").unwrap();
    static ref O_APOSTROPHE_PATTERN: Regex = Regex::new(r"\bO'([a-z])").unwrap();
}

/// Normalize a name string: trim, title-case ALL-CAPS or all-lowercase
/// input, and fix Mc/Mac/O' casing.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return String::new();
    }

    let name = if name.chars().all(|c| !c.is_lowercase()) || name.chars().all(|c| !c.is_uppercase())
    {
        title_case(name)
    } else {
        name.to_string()
    };

    fix_name_casing(&name)
}

fn title_case(s: &str) -> String {
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

fn fix_name_casing(name: &str) -> String {
    let name = MC_PATTERN.replace_all(name, |caps: &regex::Captures| {
        format!("Mc{}", caps[1].to_uppercase())
    });
    let name = MAC_PATTERN.replace_all(&name, |caps: &regex::Captures| {
        format!("Mac{}", caps[1].to_uppercase())
    });
    let name = O_APOSTROPHE_PATTERN.replace_all(&name, |caps: &regex::Captures| {
        format!("O'{}", caps[1].to_uppercase())
    });
    name.into_owned()
}

fn is_prefix(word: &str) -> bool {
    PREFIXES.contains(&word.to_lowercase().trim_end_matches('.'))
}

fn is_suffix(word: &str) -> bool {
    SUFFIXES.contains(&word.to_lowercase().trim_end_matches('.'))
}

/// Parse a full name into components.
///
/// Handles "John Smith", "John Michael Smith", "Dr. John Smith Jr.", and
/// "Smith, John" forms.
pub fn parse_full_name(full_name: &str) -> ParsedName {
    let name = full_name.trim();
    if name.is_empty() {
        return ParsedName::default();
    }

    if name.contains(',') {
        return parse_last_first(name);
    }

    let mut parts: Vec<&str> = name.split_whitespace().collect();

    let prefix = if parts.first().is_some_and(|w| is_prefix(w)) {
        Some(parts.remove(0).to_string())
    } else {
        None
    };

    let suffix = if parts.last().is_some_and(|w| is_suffix(w)) {
        parts.pop().map(str::to_string)
    } else {
        None
    };

    match parts.len() {
        0 => ParsedName {
            prefix,
            suffix,
            ..Default::default()
        },
        1 => ParsedName {
            first_name: normalize_name(parts[0]),
            prefix,
            suffix,
            ..Default::default()
        },
        2 => ParsedName {
            first_name: normalize_name(parts[0]),
            last_name: normalize_name(parts[1]),
            middle_name: None,
            prefix,
            suffix,
        },
        _ => ParsedName {
            first_name: normalize_name(parts[0]),
            middle_name: Some(normalize_name(&parts[1..parts.len() - 1].join(" "))),
            last_name: normalize_name(parts[parts.len() - 1]),
            prefix,
            suffix,
        },
    }
}

fn parse_last_first(name: &str) -> ParsedName {
    let Some((last_part, first_part)) = name.split_once(',') else {
        return ParsedName {
            first_name: name.to_string(),
            ..Default::default()
        };
    };

    let mut last_words: Vec<&str> = last_part.split_whitespace().collect();
    let suffix = if last_words.last().is_some_and(|w| is_suffix(w)) {
        last_words.pop().map(str::to_string)
    } else {
        None
    };
    let last_name = normalize_name(&last_words.join(" "));

    let first_words: Vec<&str> = first_part.split_whitespace().collect();
    match first_words.len() {
        0 => ParsedName {
            last_name,
            suffix,
            ..Default::default()
        },
        1 => ParsedName {
            first_name: normalize_name(first_words[0]),
            last_name,
            suffix,
            ..Default::default()
        },
        _ => ParsedName {
            first_name: normalize_name(first_words[0]),
            middle_name: Some(normalize_name(&first_words[1..].join(" "))),
            last_name,
            suffix,
            ..Default::default()
        },
    }
}

/// Combine parsed components back into a display string.
pub fn combine_name(parsed: &ParsedName, include_prefix: bool) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if include_prefix {
        if let Some(prefix) = &parsed.prefix {
            parts.push(prefix);
        }
    }
    if !parsed.first_name.is_empty() {
        parts.push(&parsed.first_name);
    }
    if let Some(middle) = &parsed.middle_name {
        parts.push(middle);
    }
    if !parsed.last_name.is_empty() {
        parts.push(&parsed.last_name);
    }
    if let Some(suffix) = &parsed.suffix {
        parts.push(suffix);
    }

    parts.join(" ")
}
