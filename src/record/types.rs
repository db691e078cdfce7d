//! Record types
//!
//! A record is one entity of the operational store: its key plus a map of
//! named values. Values arrive in the store's JSON export form, where an
//! object carrying a `value` is a typed wrapper
//! (`{"type": "blob", "value": ...}`), an array holds several values and
//! anything else is a plain value.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Keys
// ============================================================================

/// Identifier of one path element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyId {
    /// String key name
    Name(String),
    /// Numeric id
    Id(i64),
}

/// One (kind, identifier) step of a key path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathElement {
    pub kind: String,
    #[serde(flatten)]
    pub id: KeyId,
}

/// Key uniquely identifying an entity: ancestor path plus namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub path: Vec<PathElement>,
}

impl EntityKey {
    /// Root key with a string name
    pub fn named(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            path: vec![PathElement {
                kind: kind.into(),
                id: KeyId::Name(name.into()),
            }],
        }
    }

    /// Root key with a numeric id
    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            namespace: None,
            path: vec![PathElement {
                kind: kind.into(),
                id: KeyId::Id(id),
            }],
        }
    }

    /// Append a child element below this key
    #[must_use]
    pub fn child(mut self, kind: impl Into<String>, id: KeyId) -> Self {
        self.path.push(PathElement {
            kind: kind.into(),
            id,
        });
        self
    }

    /// Set the namespace
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Kind of the entity (kind of the last path element)
    pub fn kind(&self) -> &str {
        self.path.last().map_or("", |e| e.kind.as_str())
    }

    /// Stable, URL-safe encoding of the full key
    pub fn encode(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(canonical)
    }

    /// Decode a key produced by [`EntityKey::encode`]
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| Error::record_decode(format!("Invalid encoded key: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::record_decode(format!("Invalid encoded key: {e}")))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}:")?;
        }
        for (i, element) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match &element.id {
                KeyId::Name(name) => write!(f, "{}({name:?})", element.kind)?,
                KeyId::Id(id) => write!(f, "{}({id})", element.kind)?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// Values
// ============================================================================

/// Value wrapped with an explicit type marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    pub value: JsonValue,
}

/// A property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Several values of one property, kept exactly as exported
    List(Vec<JsonValue>),
    /// Typed wrapper, e.g. `{"type": "blob", "value": "..."}`
    Tagged(TaggedValue),
    /// Plain JSON value
    Scalar(JsonValue),
}

impl PropertyValue {
    /// Typed wrapper value
    pub fn tagged(value_type: impl Into<String>, value: JsonValue) -> Self {
        PropertyValue::Tagged(TaggedValue {
            value_type: Some(value_type.into()),
            value,
        })
    }
}

impl From<JsonValue> for PropertyValue {
    fn from(value: JsonValue) -> Self {
        PropertyValue::Scalar(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Scalar(JsonValue::String(value.to_string()))
    }
}

// ============================================================================
// Records
// ============================================================================

/// One entity to export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: EntityKey,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Record {
    /// Create a record without properties
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Add a property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Kind of the record
    pub fn kind(&self) -> &str {
        self.key.kind()
    }

    /// Decode a record from its JSON export form
    pub fn from_json(value: JsonValue) -> Result<Self> {
        let record: Record =
            serde_json::from_value(value).map_err(|e| Error::record_decode(e.to_string()))?;
        if record.key.path.is_empty() {
            return Err(Error::record_decode("record key has an empty path"));
        }
        Ok(record)
    }
}
