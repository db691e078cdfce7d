//! In-memory statistics source

use super::source::{PropertyStatStream, StatsSource};
use super::types::{KindStat, PropertyStat};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON dump of the two statistic kinds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsDump {
    #[serde(default)]
    pub kinds: Vec<KindStat>,
    #[serde(default)]
    pub properties: Vec<PropertyStat>,
}

/// Statistics held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    kinds: Vec<KindStat>,
    properties: Vec<PropertyStat>,
}

impl MemoryStats {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add kind statistics
    #[must_use]
    pub fn with_kind(mut self, stat: KindStat) -> Self {
        self.kinds.push(stat);
        self
    }

    /// Add property statistics
    #[must_use]
    pub fn with_property(mut self, stat: PropertyStat) -> Self {
        self.properties.push(stat);
        self
    }

    /// Load a JSON dump from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load a JSON dump from a string
    pub fn from_json(json: &str) -> Result<Self> {
        let dump: StatsDump = serde_json::from_str(json)
            .map_err(|e| Error::stats(format!("Failed to parse stats dump: {e}")))?;
        Ok(dump.into())
    }
}

impl From<StatsDump> for MemoryStats {
    fn from(dump: StatsDump) -> Self {
        Self {
            kinds: dump.kinds,
            properties: dump.properties,
        }
    }
}

#[async_trait]
impl StatsSource for MemoryStats {
    async fn kind_stat(&self, kind: &str) -> Result<Option<KindStat>> {
        Ok(self.kinds.iter().find(|k| k.kind == kind).cloned())
    }

    fn property_stats<'a>(&'a self, kind: &'a str) -> PropertyStatStream<'a> {
        let mut matching: Vec<PropertyStat> = self
            .properties
            .iter()
            .filter(|p| p.kind == kind)
            .cloned()
            .collect();
        // Stable: entries sharing a name keep their insertion order
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        stream::iter(matching.into_iter().map(Ok)).boxed()
    }
}
