//! Schema inference module
//!
//! Derives an analytical table schema for a kind from the aggregate
//! statistics the store keeps about itself. No entity is read.
//!
//! # Rules
//!
//! - **Type Mapping**: declared property types map onto a fixed set of
//!   column types; unmapped types are dropped
//! - **Repeated Detection**: more stored values than entities means the
//!   property is multi-valued
//! - **Deterministic Order**: fields follow property-name order

mod inference;
mod types;

pub use inference::{is_repeated, SchemaInferrer};
pub use types::{FieldSchema, FieldType, TableSchema};
