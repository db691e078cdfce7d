//! Warehouse module
//!
//! Talks to the warehouse REST API: creates tables from inferred schemas and
//! streams normalized rows through the `insertAll` endpoint.
//!
//! # Features
//!
//! - **Table creation**: one `bigquery#table` request per kind
//! - **Streaming ingestion**: one `insertAll` call per batch
//! - **Insert ids**: encoded entity key plus a strictly increasing stamp
//! - **Partial failures**: rejected rows are folded into one error

mod ingest;
mod table;
mod target;
mod types;

pub use ingest::{insert_id, next_insert_stamp, Ingestor};
pub use table::TableCreator;
pub use target::{WarehouseTarget, DEFAULT_ENDPOINT};
pub use types::{
    ErrorProto, InsertAllRequest, InsertAllResponse, InsertRow, RowFailure, Table,
    TableFieldSchema, TableReference, TableSchemaWire, INSERT_ALL_REQUEST_KIND, TABLE_KIND,
};
