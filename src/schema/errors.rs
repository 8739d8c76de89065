//! Schema registry errors
//!
//! All schema errors are raised while the registry is being built, before the
//! first request is served. A process with an invalid schema does not start.

use thiserror::Error;

/// Result type for registry construction
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Resource or field name is not a plain SQL identifier
    #[error("Invalid name '{0}': names must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidName(String),

    /// Resource declares no fields
    #[error("Resource '{0}' declares no fields")]
    NoFields(String),

    /// Field name used twice within one resource
    #[error("Resource '{resource}' declares field '{field}' more than once")]
    DuplicateField { resource: String, field: String },

    /// Resource name used twice
    #[error("Resource '{0}' is declared more than once")]
    DuplicateResource(String),

    /// Not exactly one identifier field
    #[error("Resource '{resource}' must declare exactly one identifier field, found {found}")]
    IdentifierCount { resource: String, found: usize },

    /// Identifier is not a required int column
    #[error("Identifier '{field}' of resource '{resource}' must be a required int field")]
    UnsupportedIdentifier { resource: String, field: String },
}
