//! Warehouse endpoint addressing

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// REST root of the warehouse API
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/bigquery/v2";

/// Project and dataset receiving the exported kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseTarget {
    pub endpoint: String,
    pub project: String,
    pub dataset: String,
}

impl WarehouseTarget {
    pub fn new(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project: project.into(),
            dataset: dataset.into(),
        }
    }

    /// Use another API root (emulators, tests)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// `{endpoint}/projects/{project}/datasets/{dataset}/tables`
    pub fn tables_url(&self) -> Result<String> {
        self.build(&[])
    }

    /// `{endpoint}/projects/{project}/datasets/{dataset}/tables/{table}/insertAll`
    pub fn insert_all_url(&self, table: &str) -> Result<String> {
        self.build(&[table, "insertAll"])
    }

    fn build(&self, tail: &[&str]) -> Result<String> {
        let mut url = Url::parse(&self.endpoint)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::config(format!("Invalid endpoint: {}", self.endpoint)))?;
            segments
                .pop_if_empty()
                .extend([
                    "projects",
                    self.project.as_str(),
                    "datasets",
                    self.dataset.as_str(),
                    "tables",
                ])
                .extend(tail);
        }
        Ok(url.into())
    }
}
