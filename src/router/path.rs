//! # Path Router
//!
//! Maps `(verb, path, query)` onto a resource, an optional identifier and a
//! page selection. Pure: no I/O, no shared mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::schema::{ResourceDef, ScalarValue, SchemaRegistry};

use super::errors::{RouteError, RouteResult};
use super::pagination::Pagination;
use super::verb::Verb;

/// Where a request points
#[derive(Debug, Clone, PartialEq)]
pub struct RequestShape {
    /// Target resource descriptor
    pub resource: Arc<ResourceDef>,

    /// Identifier for item-level requests, `None` for collection-level
    pub id: Option<ScalarValue>,

    /// Page selection (defaults unless the verb is a read)
    pub pagination: Pagination,
}

impl RequestShape {
    pub fn is_item(&self) -> bool {
        self.id.is_some()
    }
}

/// Resolves paths against a schema registry
#[derive(Debug, Clone)]
pub struct PathRouter {
    registry: Arc<SchemaRegistry>,
}

impl PathRouter {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Route a request.
    ///
    /// Leading and trailing slashes are ignored. Pagination is only read for
    /// [`Verb::Read`]; writes never page.
    pub fn route(
        &self,
        verb: Verb,
        path: &str,
        query: &HashMap<String, String>,
    ) -> RouteResult<RequestShape> {
        let trimmed = path.trim_matches('/');
        let mut segments = trimmed.split('/');

        // split always yields at least one item
        let name = segments.next().unwrap_or_default();
        let resource = self
            .registry
            .get(name)
            .ok_or_else(|| RouteError::UnknownResource(name.to_string()))?;

        let id = match (segments.next(), segments.next()) {
            (None, _) => None,
            (Some(segment), None) if !segment.is_empty() => {
                let id_field = resource
                    .identifier()
                    .ok_or_else(|| RouteError::MalformedPath(path.to_string()))?;
                let value = id_field.field_type.parse_segment(segment).ok_or_else(|| {
                    RouteError::InvalidIdentifier {
                        value: segment.to_string(),
                        expected: id_field.field_type.type_name(),
                    }
                })?;
                Some(value)
            }
            _ => return Err(RouteError::MalformedPath(path.to_string())),
        };

        let pagination = match verb {
            Verb::Read => Pagination::parse(query)?,
            _ => Pagination::default(),
        };

        trace!(
            verb = %verb,
            resource = %resource.name,
            item = id.is_some(),
            "routed request"
        );

        Ok(RequestShape {
            resource,
            id,
            pagination,
        })
    }
}
