//! Record module
//!
//! Models raw entities handed over for export and turns each one into a
//! flat row the warehouse accepts.
//!
//! # Features
//!
//! - **Closed value model**: scalars, typed wrappers and sequences
//! - **Exclusion policy**: a regular expression over property names
//! - **Field names**: property names rewritten into valid column names
//! - **Ingestion timestamp**: every row carries `__timestamp__`

mod field_name;
mod normalize;
mod types;

pub use field_name::{make_field_name, MAX_FIELD_NAME_LEN};
pub use normalize::{
    normalize_value, NormalizedRow, Normalizer, BLOB_PLACEHOLDER, BLOB_TYPE, TIMESTAMP_FIELD,
};
pub use types::{EntityKey, KeyId, PathElement, PropertyValue, Record, TaggedValue};
