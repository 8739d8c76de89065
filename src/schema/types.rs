//! Resource type definitions
//!
//! Supported field types:
//! - int: 64-bit signed integer
//! - string: UTF-8 string
//! - float: 64-bit floating point
//! - bool: Boolean (stored as 0/1)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    String,
    Float,
    Bool,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
        }
    }

    /// SQLite column affinity used when creating tables
    pub fn column_type(&self) -> &'static str {
        match self {
            FieldType::Int | FieldType::Bool => "INTEGER",
            FieldType::String => "TEXT",
            FieldType::Float => "REAL",
        }
    }

    /// Convert a JSON body value into a typed scalar.
    ///
    /// Returns `None` when the JSON type does not match exactly. `null` maps to
    /// [`ScalarValue::Null`]; callers decide whether null is acceptable.
    pub fn coerce_json(&self, value: &Value) -> Option<ScalarValue> {
        if value.is_null() {
            return Some(ScalarValue::Null);
        }
        match self {
            FieldType::Int => value.as_i64().map(ScalarValue::Int),
            FieldType::String => value.as_str().map(|s| ScalarValue::Text(s.to_string())),
            FieldType::Float => value.as_f64().map(ScalarValue::Real),
            FieldType::Bool => value.as_bool().map(ScalarValue::Bool),
        }
    }

    /// Parse a path segment into a typed scalar
    pub fn parse_segment(&self, segment: &str) -> Option<ScalarValue> {
        match self {
            FieldType::Int => segment.parse().ok().map(ScalarValue::Int),
            FieldType::String if !segment.is_empty() => {
                Some(ScalarValue::Text(segment.to_string()))
            }
            FieldType::String => None,
            FieldType::Float => segment
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(ScalarValue::Real),
            FieldType::Bool => segment.parse().ok().map(ScalarValue::Bool),
        }
    }
}

/// A typed value bound to a query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Int(i64),
    Text(String),
    Real(f64),
    Bool(bool),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

/// Column definition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Column name
    pub name: String,

    /// Column type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the field must be supplied on create
    #[serde(default)]
    pub required: bool,

    /// Whether this is the identifier (primary key) column
    #[serde(default)]
    pub identifier: bool,
}

impl FieldDef {
    /// Create a required field
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            identifier: false,
        }
    }

    /// Create an optional field
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// Create the integer identifier field
    pub fn identifier(name: impl Into<String>) -> Self {
        Self {
            identifier: true,
            ..Self::required(name, FieldType::Int)
        }
    }
}

/// A named, schema-described collection of records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDef {
    /// Resource name (also the table name and first path segment)
    pub name: String,

    /// Ordered field definitions
    pub fields: Vec<FieldDef>,
}

impl ResourceDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// The built-in music catalog resource
    pub fn music() -> Self {
        Self::new(
            "music",
            vec![
                FieldDef::identifier("id"),
                FieldDef::required("artist", FieldType::String),
                FieldDef::required("album", FieldType::String),
                FieldDef::required("title", FieldType::String),
                FieldDef::required("duration", FieldType::Int),
                FieldDef::required("spotifyLink", FieldType::String),
            ],
        )
    }

    /// Get the identifier field.
    ///
    /// Always `Some` for descriptors held by a `SchemaRegistry`.
    pub fn identifier(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.identifier)
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields a caller may write (everything except the identifier)
    pub fn writable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.identifier)
    }

    /// Render `CREATE TABLE IF NOT EXISTS` for this resource
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                if f.identifier {
                    format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quote_ident(&f.name))
                } else if f.required {
                    format!("{} {} NOT NULL", quote_ident(&f.name), f.field_type.column_type())
                } else {
                    format!("{} {}", quote_ident(&f.name), f.field_type.column_type())
                }
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.name),
            columns.join(", ")
        )
    }
}

/// Quote a schema-declared identifier for use in query text.
///
/// Only ever called with names that passed registry validation.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name)
}
