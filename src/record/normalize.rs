//! Record normalization
//!
//! Turns a [`Record`] into a flat row: excluded properties are dropped,
//! names are sanitized, sequences become JSON text and opaque payloads are
//! replaced by a placeholder.

use super::field_name::make_field_name;
use super::types::{PropertyValue, Record, TaggedValue};
use crate::error::Result;
use crate::types::JsonValue;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Reserved column holding the normalization time
pub const TIMESTAMP_FIELD: &str = "__timestamp__";

/// Text stored in place of opaque payloads
pub const BLOB_PLACEHOLDER: &str = "(blob)";

/// Type marker of opaque payloads
pub const BLOB_TYPE: &str = "blob";

/// A warehouse-ready row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRow(BTreeMap<String, JsonValue>);

impl NormalizedRow {
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, JsonValue> {
        self.0
    }
}

/// Normalizes records under one exclusion policy
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    exclude: Option<Regex>,
}

impl Normalizer {
    /// Create a normalizer excluding property names matching `pattern`.
    ///
    /// A blank pattern excludes nothing. An invalid pattern is logged and
    /// also excludes nothing.
    pub fn new(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Self::default();
        }

        match Regex::new(pattern) {
            Ok(re) => {
                debug!("Using exclude regexp: {}", re);
                Self { exclude: Some(re) }
            }
            Err(e) => {
                warn!("Unable to parse exclude regexp {:?}: {}", pattern, e);
                Self::default()
            }
        }
    }

    /// Whether a property is dropped by the exclusion policy
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// Exclusion pattern in use, if any
    pub fn pattern(&self) -> Option<&str> {
        self.exclude.as_ref().map(Regex::as_str)
    }

    /// Normalize a record, stamping it with the current time
    pub fn normalize(&self, record: &Record) -> NormalizedRow {
        self.normalize_at(record, Utc::now())
    }

    /// Decode a record from its JSON export form and normalize it
    pub fn normalize_json(&self, raw: JsonValue) -> Result<NormalizedRow> {
        let record = Record::from_json(raw)?;
        Ok(self.normalize(&record))
    }

    /// Normalize a record with an explicit ingestion time.
    ///
    /// When two property names sanitize to the same column, the one sorting
    /// last wins. A property named like [`TIMESTAMP_FIELD`] is overwritten.
    pub fn normalize_at(&self, record: &Record, at: DateTime<Utc>) -> NormalizedRow {
        let mut row = BTreeMap::new();

        for (name, value) in &record.properties {
            if self.is_excluded(name) {
                continue;
            }
            row.insert(make_field_name(name), normalize_value(value));
        }

        row.insert(
            TIMESTAMP_FIELD.to_string(),
            JsonValue::String(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        NormalizedRow(row)
    }
}

/// Normalize one property value
pub fn normalize_value(value: &PropertyValue) -> JsonValue {
    match value {
        PropertyValue::Scalar(v) => v.clone(),
        PropertyValue::Tagged(tagged) => normalize_tagged(tagged),
        PropertyValue::List(items) => normalize_list(items),
    }
}

fn normalize_tagged(tagged: &TaggedValue) -> JsonValue {
    if is_blob(tagged) {
        JsonValue::String(BLOB_PLACEHOLDER.to_string())
    } else {
        tagged.value.clone()
    }
}

fn normalize_list(items: &[JsonValue]) -> JsonValue {
    let text = match items.first() {
        None => String::new(),
        Some(first) if is_blob_element(first) => BLOB_PLACEHOLDER.to_string(),
        Some(_) => serde_json::to_string(items).unwrap_or_else(|e| {
            debug!("Unable to serialize list value: {}", e);
            String::new()
        }),
    };
    JsonValue::String(text)
}

fn is_blob(tagged: &TaggedValue) -> bool {
    tagged.value_type.as_deref() == Some(BLOB_TYPE)
}

fn is_blob_element(item: &JsonValue) -> bool {
    item.get("type").and_then(JsonValue::as_str) == Some(BLOB_TYPE)
}
