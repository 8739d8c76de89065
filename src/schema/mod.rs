//! Schema registry for crudgate
//!
//! Resources are declared statically (or in the config file), validated once
//! before the first request, and never mutated afterwards.
//!
//! # Invariants
//!
//! - Exactly one identifier field per resource, a required `int`
//! - Field names are unique within a resource
//! - Resource and field names are plain SQL identifiers, so they can be
//!   quoted into query text without escaping caller data

mod errors;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use types::{quote_ident, FieldDef, FieldType, ResourceDef, ScalarValue};
