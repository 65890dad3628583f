//! Tabular record model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single tabular record: an ordered mapping from field name to string value.
///
/// Records never assume a concrete schema. Components access values by name;
/// a missing field reads as an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a record from (name, value) pairs, preserving order.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { fields: pairs }
    }

    /// Get a field value by name, if the field exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a field value by name, treating a missing field as empty.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Set a field value, replacing an existing field or appending a new one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Rename a field, keeping its position and value.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some((n, _)) = self.fields.iter_mut().find(|(n, _)| n == from) {
            *n = to.to_string();
        }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate (name, value) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields with a non-blank value.
    pub fn non_empty_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .count()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An in-memory batch of records sharing a column order.
///
/// Record index equals position in the batch and is stable for the whole run;
/// the matching pipeline treats the batch as read-only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecordBatch {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordBatch {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Field value at (record index, field name); missing reads as empty.
    pub fn value(&self, index: usize, field: &str) -> &str {
        self.records
            .get(index)
            .map(|r| r.value(field))
            .unwrap_or("")
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Rename columns per the given mapping, in both the column list and
    /// every record. Names absent from the mapping are left untouched.
    pub fn rename_columns(&mut self, mapping: &HashMap<String, String>) {
        for column in &mut self.columns {
            if let Some(new_name) = mapping.get(column) {
                let old = std::mem::replace(column, new_name.clone());
                for record in &mut self.records {
                    record.rename(&old, new_name);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        Record::from_pairs(
            pairs
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_get_and_value() {
        let r = record(&[("email", "a@x.com"), ("phone", "")]);
        assert_eq!(r.get("email"), Some("a@x.com"));
        assert_eq!(r.get("missing"), None);
        assert_eq!(r.value("missing"), "");
        assert_eq!(r.value("phone"), "");
    }

    #[test]
    fn test_set_replaces_or_appends() {
        let mut r = record(&[("email", "a@x.com")]);
        r.set("email", "b@x.com");
        r.set("city", "Springfield");
        assert_eq!(r.value("email"), "b@x.com");
        assert_eq!(r.value("city"), "Springfield");
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_non_empty_count_ignores_blank() {
        let r = record(&[("a", "x"), ("b", "  "), ("c", ""), ("d", "y")]);
        assert_eq!(r.non_empty_count(), 2);
    }

    #[test]
    fn test_rename_columns() {
        let mut batch = RecordBatch::new(vec!["mail".into(), "tel".into()]);
        batch.push(record(&[("mail", "a@x.com"), ("tel", "555")]));

        let mapping = HashMap::from([("mail".to_string(), "email".to_string())]);
        batch.rename_columns(&mapping);

        assert_eq!(batch.columns(), &["email".to_string(), "tel".to_string()]);
        assert_eq!(batch.value(0, "email"), "a@x.com");
        assert_eq!(batch.value(0, "mail"), "");
    }
}
