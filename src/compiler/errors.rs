//! # Compiler Errors

use thiserror::Error;

use crate::errors::ErrorKind;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Body names a field the resource does not declare, or a generated one
    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    /// Required field absent or null
    #[error("Missing required field: '{0}'")]
    MissingField(String),

    /// Field value has the wrong JSON type
    #[error("Field '{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Update body with no fields
    #[error("Update must set at least one field")]
    EmptyUpdate,

    /// Body is not a JSON object
    #[error("Request body must be a JSON object")]
    InvalidBody,

    /// Update or delete addressed at a collection
    #[error("{0} requires an item identifier in the path")]
    MissingIdentifier(&'static str),

    /// Create addressed at an item, or an item of a resource without identifier
    #[error("Request must target the collection, not an item")]
    UnexpectedIdentifier,
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnknownField(_) => ErrorKind::UnknownField,
            CompileError::MissingField(_) => ErrorKind::MissingField,
            CompileError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            CompileError::EmptyUpdate => ErrorKind::EmptyUpdate,
            CompileError::InvalidBody => ErrorKind::InvalidBody,
            CompileError::MissingIdentifier(_) => ErrorKind::MissingIdentifier,
            CompileError::UnexpectedIdentifier => ErrorKind::UnexpectedIdentifier,
        }
    }
}
