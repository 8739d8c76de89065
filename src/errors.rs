//! Stable error kinds shared by every request-handling stage
//!
//! The kind string is part of the public response contract. Messages may be
//! reworded, kinds may not.

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    // Router
    UnknownResource,
    InvalidIdentifier,
    MalformedPath,
    InvalidPagination,
    UnsupportedMethod,

    // Compiler
    UnknownField,
    MissingField,
    TypeMismatch,
    EmptyUpdate,
    InvalidBody,
    MissingIdentifier,
    UnexpectedIdentifier,

    // Executor
    NotFound,
    Conflict,
    StoreUnavailable,
    Timeout,
}

impl ErrorKind {
    /// Returns the kind string sent to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownResource => "UnknownResource",
            ErrorKind::InvalidIdentifier => "InvalidIdentifier",
            ErrorKind::MalformedPath => "MalformedPath",
            ErrorKind::InvalidPagination => "InvalidPagination",
            ErrorKind::UnsupportedMethod => "UnsupportedMethod",
            ErrorKind::UnknownField => "UnknownField",
            ErrorKind::MissingField => "MissingField",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::EmptyUpdate => "EmptyUpdate",
            ErrorKind::InvalidBody => "InvalidBody",
            ErrorKind::MissingIdentifier => "MissingIdentifier",
            ErrorKind::UnexpectedIdentifier => "UnexpectedIdentifier",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::StoreUnavailable => "StoreUnavailable",
            ErrorKind::Timeout => "Timeout",
        }
    }

    /// Get HTTP status code for this kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ErrorKind::InvalidIdentifier
            | ErrorKind::MalformedPath
            | ErrorKind::InvalidPagination
            | ErrorKind::UnknownField
            | ErrorKind::MissingField
            | ErrorKind::TypeMismatch
            | ErrorKind::EmptyUpdate
            | ErrorKind::InvalidBody => StatusCode::BAD_REQUEST,

            // 404 Not Found
            ErrorKind::UnknownResource | ErrorKind::NotFound => StatusCode::NOT_FOUND,

            // 405 Method Not Allowed
            ErrorKind::UnsupportedMethod
            | ErrorKind::MissingIdentifier
            | ErrorKind::UnexpectedIdentifier => StatusCode::METHOD_NOT_ALLOWED,

            // 409 Conflict
            ErrorKind::Conflict => StatusCode::CONFLICT,

            // 5xx
            ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Whether the caller caused this error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
