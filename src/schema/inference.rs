//! Schema inference from datastore statistics

use super::types::{FieldSchema, FieldType, TableSchema};
use crate::error::{Error, Result};
use crate::record::make_field_name;
use crate::stats::{KindStat, PropertyStat, StatsSource};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info};

/// Whether a property should be a repeated column.
///
/// More stored values than entities means at least one entity holds the
/// property more than once. The statistics carry no per-entity cardinality,
/// so a list property that never holds more than one value on any entity
/// is reported as not repeated.
pub fn is_repeated(property: &PropertyStat, kind: &KindStat) -> bool {
    property.count > kind.count
}

/// Infers table schemas from a statistics source
#[derive(Clone)]
pub struct SchemaInferrer {
    source: Arc<dyn StatsSource>,
}

impl SchemaInferrer {
    /// Create an inferrer reading from the given source
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self { source }
    }

    /// Infer the schema of a kind.
    ///
    /// Fails with [`Error::KindStatsNotFound`] when the kind has no
    /// statistics, and with the source's error when a property entry cannot
    /// be loaded.
    pub async fn infer(&self, kind: &str) -> Result<TableSchema> {
        let kind_stat = self
            .source
            .kind_stat(kind)
            .await?
            .ok_or_else(|| Error::kind_not_found(kind))?;

        let mut schema = TableSchema::default();
        let mut properties = self.source.property_stats(kind);

        while let Some(property) = properties.next().await {
            let property = property?;

            let Some(field_type) = FieldType::from_property_type(&property.property_type) else {
                debug!(
                    "Skipping {}.{}: unmapped type {}",
                    kind, property.name, property.property_type
                );
                continue;
            };

            let field = FieldSchema {
                name: make_field_name(&property.name),
                field_type,
                repeated: is_repeated(&property, &kind_stat),
            };
            if !schema.push(field) {
                debug!(
                    "Skipping {}.{}: already mapped from an earlier entry",
                    kind, property.name
                );
            }
        }

        info!("Inferred {} fields for kind {}", schema.len(), kind);
        Ok(schema)
    }
}

impl std::fmt::Debug for SchemaInferrer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaInferrer").finish_non_exhaustive()
    }
}
