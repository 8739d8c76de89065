//! # Router Errors

use thiserror::Error;

use crate::errors::ErrorKind;

/// Result type for routing
pub type RouteResult<T> = Result<T, RouteError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// First path segment names no registered resource
    #[error("Unknown resource: '{0}'")]
    UnknownResource(String),

    /// Item segment does not parse as the identifier type
    #[error("Invalid identifier '{value}', expected {expected}")]
    InvalidIdentifier { value: String, expected: &'static str },

    /// Too many or empty path segments
    #[error("Malformed path: '{0}'")]
    MalformedPath(String),

    /// Bad `page` or `pageSize`
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// HTTP method with no CRUD meaning
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}

impl RouteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteError::UnknownResource(_) => ErrorKind::UnknownResource,
            RouteError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            RouteError::MalformedPath(_) => ErrorKind::MalformedPath,
            RouteError::InvalidPagination(_) => ErrorKind::InvalidPagination,
            RouteError::UnsupportedMethod(_) => ErrorKind::UnsupportedMethod,
        }
    }
}
