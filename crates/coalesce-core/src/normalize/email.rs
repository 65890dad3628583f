//! Email normalization and validation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Parsed email components
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailParts {
    pub local: String,
    pub domain: String,
    pub subdomain: Option<String>,
    pub tld: String,
}

/// Normalize an email address: trim, lowercase, strip a `mailto:` prefix,
/// validate the basic shape. Returns `None` for invalid input.
pub fn normalize_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut email = trimmed.to_lowercase();
    if let Some(rest) = email.strip_prefix("mailto:") {
        email = rest.to_string();
    }

    if !is_valid_email(&email) {
        return None;
    }

    Some(email)
}

/// Strict normalization: additionally fold Gmail dot- and plus-addressing
/// variants onto one canonical address.
pub fn normalize_email_strict(email: &str) -> Option<String> {
    let normalized = normalize_email(email)?;
    let parts = parse_email(&normalized)?;

    if parts.domain == "gmail.com" || parts.domain == "googlemail.com" {
        let mut local = parts.local.replace('.', "");
        if let Some(pos) = local.find('+') {
            local.truncate(pos);
        }
        return Some(format!("{local}@gmail.com"));
    }

    Some(normalized)
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim().to_lowercase();
    !email.is_empty() && EMAIL_PATTERN.is_match(&email)
}

/// Parse an email into local part, domain, subdomain, and TLD.
pub fn parse_email(email: &str) -> Option<EmailParts> {
    if !is_valid_email(email) {
        return None;
    }

    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;

    let domain_parts: Vec<&str> = domain.split('.').collect();
    let tld = domain_parts.last()?.to_string();

    let (subdomain, domain) = if domain_parts.len() > 2 {
        (
            Some(domain_parts[..domain_parts.len() - 2].join(".")),
            domain_parts[domain_parts.len() - 2..].join("."),
        )
    } else {
        (None, domain.to_string())
    };

    Some(EmailParts {
        local: local.to_string(),
        domain,
        subdomain,
        tld,
    })
}

pub fn extract_domain(email: &str) -> Option<String> {
    parse_email(email).map(|p| p.domain)
}
