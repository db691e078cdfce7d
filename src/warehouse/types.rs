//! Wire types of the warehouse REST API

use crate::error::{Error, Result};
use crate::record::NormalizedRow;
use crate::schema::{FieldSchema, TableSchema};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `kind` of every streaming insert request
pub const INSERT_ALL_REQUEST_KIND: &str = "bigquery#tableDataInsertAllRequest";

/// `kind` of table resources
pub const TABLE_KIND: &str = "bigquery#table";

// ============================================================================
// Streaming insert
// ============================================================================

/// One row of a streaming insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRow {
    /// Deduplication token for the row
    pub insert_id: String,
    pub json: NormalizedRow,
}

/// Body of an `insertAll` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertAllRequest {
    pub kind: String,
    pub rows: Vec<InsertRow>,
}

impl InsertAllRequest {
    pub fn new(rows: Vec<InsertRow>) -> Self {
        Self {
            kind: INSERT_ALL_REQUEST_KIND.to_string(),
            rows,
        }
    }
}

/// Response of an `insertAll` call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub insert_errors: Vec<RowFailure>,
}

impl InsertAllResponse {
    /// Decode a success body; an empty body reports no errors
    pub fn from_body(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(body)?)
    }

    /// Turn rejected rows into a single error
    pub fn into_result(self) -> Result<()> {
        if self.insert_errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InsertErrors {
                failures: self.insert_errors,
            })
        }
    }
}

/// Errors reported for one rejected row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Position of the row in the request
    pub index: u32,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

/// Error detail as returned by the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorProto {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ErrorProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            ("reason", &self.reason),
            ("location", &self.location),
            ("message", &self.message),
        ];

        let mut first = true;
        for (label, value) in parts {
            if let Some(value) = value {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{label}: {value}")?;
                first = false;
            }
        }

        if first {
            f.write_str("unknown error")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Identity of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

/// Column definition on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl From<&FieldSchema> for TableFieldSchema {
    fn from(field: &FieldSchema) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type.as_str().to_string(),
            mode: field.repeated.then(|| "REPEATED".to_string()),
        }
    }
}

/// Schema block of a table resource
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchemaWire {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

impl From<&TableSchema> for TableSchemaWire {
    fn from(schema: &TableSchema) -> Self {
        Self {
            fields: schema.fields().iter().map(TableFieldSchema::from).collect(),
        }
    }
}

/// Table resource, as sent on creation and as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub schema: TableSchemaWire,
    pub table_reference: TableReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl Table {
    /// Creation request for the table of a kind
    pub fn for_kind(project: &str, dataset: &str, kind: &str, schema: &TableSchema) -> Self {
        Self {
            kind: TABLE_KIND.to_string(),
            id: None,
            description: Some(format!("BigQuery table for datastore kind {kind}")),
            friendly_name: Some(kind.to_string()),
            schema: TableSchemaWire::from(schema),
            table_reference: TableReference {
                project_id: project.to_string(),
                dataset_id: dataset.to_string(),
                table_id: kind.to_string(),
            },
            creation_time: None,
            self_link: None,
        }
    }
}
