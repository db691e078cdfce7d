//! Table creation from inferred schemas

use super::target::WarehouseTarget;
use super::types::Table;
use crate::error::Result;
use crate::http::ClientProvider;
use crate::schema::SchemaInferrer;
use std::sync::Arc;
use tracing::{error, info};

/// Creates one warehouse table per kind
#[derive(Clone)]
pub struct TableCreator {
    inferrer: SchemaInferrer,
    provider: Arc<dyn ClientProvider>,
    target: WarehouseTarget,
}

impl TableCreator {
    pub fn new(
        inferrer: SchemaInferrer,
        provider: Arc<dyn ClientProvider>,
        target: WarehouseTarget,
    ) -> Self {
        Self {
            inferrer,
            provider,
            target,
        }
    }

    pub fn target(&self) -> &WarehouseTarget {
        &self.target
    }

    /// Build the creation request for a kind without sending it
    pub async fn table_for_kind(&self, kind: &str) -> Result<Table> {
        let schema = self.inferrer.infer(kind).await?;
        Ok(Table::for_kind(
            &self.target.project,
            &self.target.dataset,
            kind,
            &schema,
        ))
    }

    /// Infer the schema of `kind` and create its table.
    ///
    /// Returns the table as described by the service.
    pub async fn create_table_for_kind(&self, kind: &str) -> Result<Table> {
        let table = self.table_for_kind(kind).await?;
        let client = self.provider.client()?;
        let url = self.target.tables_url()?;

        let created: Table = client.post_json(&url, &table).await.map_err(|e| {
            error!("Failed to create table for kind {}: {}", kind, e);
            e
        })?;

        info!(
            "Created table {}.{}.{} with {} fields",
            created.table_reference.project_id,
            created.table_reference.dataset_id,
            created.table_reference.table_id,
            created.schema.fields.len()
        );
        Ok(created)
    }
}

impl std::fmt::Debug for TableCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCreator")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
