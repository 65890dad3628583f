//! Canonical schema definition and persistence

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Schema load/save error type
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid schema file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Semantic kind of a column, driving similarity and blocking behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Phone,
    /// Person-name fields (first/last name) block on short prefixes.
    Name,
}

/// Configuration for a single canonical column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub description: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, aliases: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            required: false,
            unique: false,
            description: String::new(),
        }
    }
}

/// The canonical vocabulary that source column labels are mapped onto.
///
/// Column order is preserved; it decides first-seen tie-breaks during fuzzy
/// matching and the output column order after mapping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanonicalSchema {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl CanonicalSchema {
    /// Canonical column names, in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn aliases_of(&self, name: &str) -> &[String] {
        self.column(name).map(|c| c.aliases.as_slice()).unwrap_or(&[])
    }

    pub fn kind_of(&self, name: &str) -> FieldKind {
        self.column(name).map(|c| c.kind).unwrap_or_default()
    }

    /// Mapping from every lowercased alias (and each canonical name itself)
    /// to its canonical owner.
    pub fn alias_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for column in &self.columns {
            map.insert(column.name.to_lowercase(), column.name.clone());
            for alias in &column.aliases {
                map.insert(alias.to_lowercase(), column.name.clone());
            }
        }
        map
    }

    /// Per-column field kinds, keyed by canonical name.
    pub fn field_kinds(&self) -> HashMap<String, FieldKind> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.kind))
            .collect()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, SchemaError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

/// The standard contact schema used when no schema file is supplied.
pub fn default_contact_schema() -> CanonicalSchema {
    CanonicalSchema {
        name: "contacts".to_string(),
        version: "1.0".to_string(),
        description: "Standard contact information schema".to_string(),
        columns: vec![
            ColumnSpec::new(
                "first_name",
                FieldKind::Name,
                &["firstname", "fname", "given_name", "givenname"],
            ),
            ColumnSpec::new(
                "last_name",
                FieldKind::Name,
                &["lastname", "lname", "surname", "family_name"],
            ),
            ColumnSpec::new("email", FieldKind::Email, &["email_address", "e_mail", "mail"]),
            ColumnSpec::new(
                "phone",
                FieldKind::Phone,
                &["phone_number", "telephone", "tel", "mobile", "cell"],
            ),
            ColumnSpec::new(
                "company",
                FieldKind::Text,
                &["organization", "org", "employer", "company_name"],
            ),
            ColumnSpec::new("title", FieldKind::Text, &["job_title", "position", "role"]),
            ColumnSpec::new(
                "address",
                FieldKind::Text,
                &["street", "street_address", "address_line_1"],
            ),
            ColumnSpec::new("city", FieldKind::Text, &["town", "locality"]),
            ColumnSpec::new(
                "state",
                FieldKind::Text,
                &["province", "region", "state_province"],
            ),
            ColumnSpec::new(
                "postal_code",
                FieldKind::Text,
                &["zip", "zip_code", "zipcode", "postcode"],
            ),
            ColumnSpec::new("country", FieldKind::Text, &["nation", "country_code"]),
        ],
    }
}
