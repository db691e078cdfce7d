//! Statistic entry types
//!
//! Field names follow the property names the store uses on its own
//! statistic entities, so JSON dumps of those entities load directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistic kind holding one entry per (kind, property, type) triple
pub const STAT_BY_PROPERTY_TABLE: &str = "__Stat_PropertyType_PropertyName_Kind__";

/// Statistic kind holding one entry per kind
pub const STAT_BY_KIND_TABLE: &str = "__Stat_Kind__";

/// Aggregate observation of one property of a kind, for one declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyStat {
    /// Kind the property belongs to
    #[serde(rename = "kind_name")]
    pub kind: String,

    /// Property name as stored
    #[serde(rename = "property_name")]
    pub name: String,

    /// Declared value type (e.g. "String", "Date/Time")
    #[serde(rename = "property_type")]
    pub property_type: String,

    /// Number of stored values of this property across all entities
    #[serde(default)]
    pub count: i64,

    /// Total bytes taken by the values
    #[serde(default)]
    pub bytes: i64,

    #[serde(rename = "builtin_index_bytes", default)]
    pub index_bytes: i64,

    #[serde(rename = "builtin_index_count", default)]
    pub index_count: i64,

    /// When the statistics were computed
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl PropertyStat {
    /// Create a property stat with the given identity and value count
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        property_type: impl Into<String>,
        count: i64,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            property_type: property_type.into(),
            count,
            bytes: 0,
            index_bytes: 0,
            index_count: 0,
            timestamp: None,
        }
    }
}

/// Aggregate observation of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStat {
    #[serde(rename = "kind_name")]
    pub kind: String,

    /// Number of entities of this kind
    #[serde(default)]
    pub count: i64,

    #[serde(default)]
    pub entity_bytes: i64,

    #[serde(rename = "builtin_index_bytes", default)]
    pub index_bytes: i64,

    #[serde(rename = "builtin_index_count", default)]
    pub index_count: i64,

    #[serde(default)]
    pub composite_index_bytes: i64,

    #[serde(default)]
    pub composite_index_count: i64,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl KindStat {
    /// Create a kind stat with the given entity count
    pub fn new(kind: impl Into<String>, count: i64) -> Self {
        Self {
            kind: kind.into(),
            count,
            entity_bytes: 0,
            index_bytes: 0,
            index_count: 0,
            composite_index_bytes: 0,
            composite_index_count: 0,
            timestamp: None,
        }
    }
}
