//! Schema types

use serde::{Deserialize, Serialize};

/// Column type of an inferred field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Timestamp,
    Boolean,
    Float,
    Integer,
}

impl FieldType {
    /// Map a declared property type onto a column type.
    ///
    /// Returns `None` for declared types without a column representation.
    pub fn from_property_type(declared: &str) -> Option<Self> {
        match declared {
            "Blob" | "BlobKey" | "Category" | "Email" | "IM" | "Key" | "Link" | "PhoneNumber"
            | "PostalAddress" | "Rating" | "ShortBlob" | "String" => Some(FieldType::String),
            "Date/Time" => Some(FieldType::Timestamp),
            "Boolean" => Some(FieldType::Boolean),
            "Float" => Some(FieldType::Float),
            "Integer" => Some(FieldType::Integer),
            _ => None,
        }
    }

    /// Wire name of the type
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Float => "FLOAT",
            FieldType::Integer => "INTEGER",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inferred field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Sanitized column name
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the column holds multiple values per row
    #[serde(default)]
    pub repeated: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            repeated: false,
        }
    }

    /// Create a repeated field
    pub fn repeated(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            repeated: true,
        }
    }
}

/// Inferred table schema, fields ordered by source property name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    fields: Vec<FieldSchema>,
}

impl TableSchema {
    /// Build a schema from fields, keeping the first field of each name
    pub fn from_fields(fields: impl IntoIterator<Item = FieldSchema>) -> Self {
        let mut schema = Self::default();
        for field in fields {
            schema.push(field);
        }
        schema
    }

    /// Append a field unless one with the same name exists.
    ///
    /// Returns whether the field was added.
    pub(crate) fn push(&mut self, field: FieldSchema) -> bool {
        if self.contains(&field.name) {
            return false;
        }
        self.fields.push(field);
        true
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to pretty JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
