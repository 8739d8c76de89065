//! # Query Compiler
//!
//! Validates a routed request and its body against the resource descriptor
//! and produces a [`CompiledOperation`].
//!
//! | Verb   | Shape      | Operation                              |
//! |--------|------------|----------------------------------------|
//! | READ   | collection | SELECT ... ORDER BY id LIMIT/OFFSET    |
//! | READ   | item       | SELECT ... WHERE id = ?                |
//! | CREATE | collection | INSERT ... RETURNING                   |
//! | UPDATE | item       | UPDATE ... SET ... WHERE id = ? RETURNING |
//! | DELETE | item       | DELETE ... WHERE id = ?                |

use serde_json::{Map, Value};

use crate::router::{RequestShape, Verb};
use crate::schema::{FieldDef, ResourceDef, ScalarValue};

use super::errors::{CompileError, CompileResult};
use super::operation::{CompiledOperation, OperationKind, Param, Predicate};

/// Stateless request-to-query compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile a routed request.
    ///
    /// `body` is only inspected for CREATE and UPDATE.
    pub fn compile(
        &self,
        shape: &RequestShape,
        verb: Verb,
        body: Option<&Value>,
    ) -> CompileResult<CompiledOperation> {
        let resource = &shape.resource;

        let (kind, params, predicate) = match verb {
            Verb::Read => match &shape.id {
                Some(id) => (OperationKind::Select, Vec::new(), id_predicate(resource, id)?),
                None => (
                    OperationKind::Select,
                    Vec::new(),
                    Predicate::Page {
                        limit: shape.pagination.limit(),
                        // Router already rejected out-of-range pages
                        offset: shape.pagination.offset().unwrap_or(0),
                    },
                ),
            },
            Verb::Create => {
                if shape.id.is_some() {
                    return Err(CompileError::UnexpectedIdentifier);
                }
                let empty = Map::new();
                let fields = body_object(body, &empty)?;
                let params = Self::create_params(resource, fields)?;
                (OperationKind::Insert, params, Predicate::None)
            }
            Verb::Update => {
                let id = shape
                    .id
                    .as_ref()
                    .ok_or(CompileError::MissingIdentifier("UPDATE"))?;
                let empty = Map::new();
                let fields = body_object(body, &empty)?;
                let params = Self::update_params(resource, fields)?;
                (OperationKind::Update, params, id_predicate(resource, id)?)
            }
            Verb::Delete => {
                let id = shape
                    .id
                    .as_ref()
                    .ok_or(CompileError::MissingIdentifier("DELETE"))?;
                (OperationKind::Delete, Vec::new(), id_predicate(resource, id)?)
            }
        };

        Ok(CompiledOperation {
            kind,
            resource: resource.clone(),
            params,
            predicate,
        })
    }

    /// Every required writable field must be present and non-null
    fn create_params(resource: &ResourceDef, body: &Map<String, Value>) -> CompileResult<Vec<Param>> {
        reject_unknown(resource, body)?;

        let mut params = Vec::new();
        for field in resource.writable_fields() {
            match body.get(&field.name) {
                Some(value) => params.push(typed_param(field, value)?),
                None if field.required => {
                    return Err(CompileError::MissingField(field.name.clone()))
                }
                None => {}
            }
        }
        Ok(params)
    }

    /// Partial update: any subset of writable fields, at least one
    fn update_params(resource: &ResourceDef, body: &Map<String, Value>) -> CompileResult<Vec<Param>> {
        reject_unknown(resource, body)?;

        let mut params = Vec::new();
        for field in resource.writable_fields() {
            if let Some(value) = body.get(&field.name) {
                params.push(typed_param(field, value)?);
            }
        }

        if params.is_empty() {
            return Err(CompileError::EmptyUpdate);
        }
        Ok(params)
    }
}

fn body_object<'a>(
    body: Option<&'a Value>,
    empty: &'a Map<String, Value>,
) -> CompileResult<&'a Map<String, Value>> {
    match body {
        None | Some(Value::Null) => Ok(empty),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(CompileError::InvalidBody),
    }
}

fn reject_unknown(resource: &ResourceDef, body: &Map<String, Value>) -> CompileResult<()> {
    for key in body.keys() {
        match resource.field(key) {
            Some(field) if !field.identifier => {}
            _ => return Err(CompileError::UnknownField(key.clone())),
        }
    }
    Ok(())
}

fn typed_param(field: &FieldDef, value: &Value) -> CompileResult<Param> {
    let scalar = field
        .field_type
        .coerce_json(value)
        .ok_or_else(|| CompileError::TypeMismatch {
            field: field.name.clone(),
            expected: field.field_type.type_name(),
            actual: json_type_name(value),
        })?;

    if scalar.is_null() && field.required {
        return Err(CompileError::MissingField(field.name.clone()));
    }

    Ok(Param {
        field: field.name.clone(),
        field_type: field.field_type,
        value: scalar,
    })
}

/// Items are only addressable on resources that declare an identifier
fn id_predicate(resource: &ResourceDef, id: &ScalarValue) -> CompileResult<Predicate> {
    let field = resource
        .identifier()
        .ok_or(CompileError::UnexpectedIdentifier)?;
    Ok(Predicate::IdEquals(Param {
        field: field.name.clone(),
        field_type: field.field_type,
        value: id.clone(),
    }))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
