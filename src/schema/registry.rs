//! Schema registry
//!
//! Holds every managed resource, validated once at start-up and shared
//! read-only afterwards.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldType, ResourceDef};

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name regex"))
}

fn check_name(name: &str) -> SchemaResult<()> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}

/// Immutable registry of resource descriptors
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    resources: HashMap<String, Arc<ResourceDef>>,
}

impl SchemaRegistry {
    /// Build a registry, validating every descriptor
    pub fn new(resources: Vec<ResourceDef>) -> SchemaResult<Self> {
        let mut map = HashMap::with_capacity(resources.len());

        for resource in resources {
            Self::validate(&resource)?;
            if map.contains_key(&resource.name) {
                return Err(SchemaError::DuplicateResource(resource.name));
            }
            info!(
                resource = %resource.name,
                fields = resource.fields.len(),
                "registered resource"
            );
            map.insert(resource.name.clone(), Arc::new(resource));
        }

        Ok(Self { resources: map })
    }

    /// Registry holding only the built-in `music` resource
    pub fn builtin() -> SchemaResult<Self> {
        Self::new(vec![ResourceDef::music()])
    }

    /// Look up a resource by exact name
    pub fn get(&self, name: &str) -> Option<Arc<ResourceDef>> {
        self.resources.get(name).cloned()
    }

    /// Registered resource names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.keys().cloned().collect();
        names.sort();
        names
    }

    /// All descriptors, sorted by name
    pub fn resources(&self) -> Vec<Arc<ResourceDef>> {
        self.names()
            .iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    fn validate(resource: &ResourceDef) -> SchemaResult<()> {
        check_name(&resource.name)?;

        if resource.fields.is_empty() {
            return Err(SchemaError::NoFields(resource.name.clone()));
        }

        let mut seen = HashSet::new();
        for field in &resource.fields {
            check_name(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    resource: resource.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let identifiers: Vec<_> = resource.fields.iter().filter(|f| f.identifier).collect();
        if identifiers.len() != 1 {
            return Err(SchemaError::IdentifierCount {
                resource: resource.name.clone(),
                found: identifiers.len(),
            });
        }

        let id = identifiers[0];
        if id.field_type != FieldType::Int || !id.required {
            return Err(SchemaError::UnsupportedIdentifier {
                resource: resource.name.clone(),
                field: id.name.clone(),
            });
        }

        Ok(())
    }
}
