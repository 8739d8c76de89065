//! # Compiled Operations
//!
//! A compiled operation is a parameterized statement over one resource.
//! Query text only ever contains quoted, registry-validated names and
//! positional placeholders; every caller-supplied value is a binding.

use std::fmt;
use std::sync::Arc;

use crate::schema::{quote_ident, FieldType, ResourceDef, ScalarValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Select => "select",
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// A value bound to one column
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub field: String,
    pub field_type: FieldType,
    pub value: ScalarValue,
}

/// Row selection
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Every row (insert)
    None,

    /// Identifier equality
    IdEquals(Param),

    /// Bounded range ordered by identifier ascending
    Page { limit: i64, offset: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOperation {
    pub kind: OperationKind,
    pub resource: Arc<ResourceDef>,

    /// Column values for insert/update, in schema order
    pub params: Vec<Param>,

    pub predicate: Predicate,
}

impl CompiledOperation {
    /// Whether the operation addresses a single record
    pub fn is_item(&self) -> bool {
        matches!(self.predicate, Predicate::IdEquals(_))
    }

    /// Render the statement text
    pub fn sql(&self) -> String {
        let table = quote_ident(&self.resource.name);
        let id = self.key_column();
        let columns = self.column_list();

        match self.kind {
            OperationKind::Select => {
                let mut sql = format!("SELECT {} FROM {}", columns, table);
                match self.predicate {
                    Predicate::IdEquals(_) => sql.push_str(&format!(" WHERE {} = ?1", id)),
                    Predicate::Page { .. } => sql.push_str(&format!(
                        " ORDER BY {} ASC LIMIT ?1 OFFSET ?2",
                        id
                    )),
                    Predicate::None => sql.push_str(&format!(" ORDER BY {} ASC", id)),
                }
                sql
            }
            OperationKind::Insert => {
                if self.params.is_empty() {
                    return format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, columns);
                }
                let names: Vec<String> = self.params.iter().map(|p| quote_ident(&p.field)).collect();
                let slots: Vec<String> = (1..=self.params.len()).map(|i| format!("?{}", i)).collect();
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                    table,
                    names.join(", "),
                    slots.join(", "),
                    columns
                )
            }
            OperationKind::Update => {
                let assignments: Vec<String> = self
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{} = ?{}", quote_ident(&p.field), i + 1))
                    .collect();
                format!(
                    "UPDATE {} SET {} WHERE {} = ?{} RETURNING {}",
                    table,
                    assignments.join(", "),
                    id,
                    self.params.len() + 1,
                    columns
                )
            }
            OperationKind::Delete => format!("DELETE FROM {} WHERE {} = ?1", table, id),
        }
    }

    /// Values for `?1..?N`, in placeholder order
    pub fn bindings(&self) -> Vec<ScalarValue> {
        let mut values: Vec<ScalarValue> = self.params.iter().map(|p| p.value.clone()).collect();
        match &self.predicate {
            Predicate::None => {}
            Predicate::IdEquals(param) => values.push(param.value.clone()),
            Predicate::Page { limit, offset } => {
                values.push(ScalarValue::Int(*limit));
                values.push(ScalarValue::Int(*offset));
            }
        }
        values
    }

    /// Column that orders and addresses rows. A descriptor that never went
    /// through the registry may lack an identifier; SQLite's `rowid` stands in.
    fn key_column(&self) -> String {
        match &self.predicate {
            Predicate::IdEquals(param) => quote_ident(&param.field),
            _ => self
                .resource
                .identifier()
                .map(|field| quote_ident(&field.name))
                .unwrap_or_else(|| "rowid".to_string()),
        }
    }

    fn column_list(&self) -> String {
        self.resource
            .fields
            .iter()
            .map(|f| quote_ident(&f.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
