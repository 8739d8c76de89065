//! # Response Envelope
//!
//! The single outbound contract: exactly one of a success payload or a typed
//! error, enforced by [`ResponseEnvelope`] being an enum.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::errors::ErrorKind;
use crate::executor::Record;

/// List response with page metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResponse {
    pub data: Vec<Record>,
    pub page: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    pub count: usize,
}

impl ListResponse {
    pub fn new(data: Vec<Record>, page: u64, page_size: u64) -> Self {
        let count = data.len();
        Self {
            data,
            page,
            page_size,
            count,
        }
    }
}

/// Single record response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleResponse {
    pub data: Record,
}

/// Delete response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn success() -> Self {
        Self { deleted: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    List(ListResponse),
    Created(SingleResponse),
    Single(SingleResponse),
    Deleted(DeleteResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Success(Payload),
    Error(ErrorResponse),
}

impl ResponseEnvelope {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        ResponseEnvelope::Error(ErrorResponse {
            error: ErrorBody {
                kind,
                message: message.into(),
            },
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ResponseEnvelope::Error(err) => Some(err.error.kind),
            ResponseEnvelope::Success(_) => None,
        }
    }

    /// HTTP status for the transport layer
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResponseEnvelope::Success(Payload::Created(_)) => StatusCode::CREATED,
            ResponseEnvelope::Success(_) => StatusCode::OK,
            ResponseEnvelope::Error(err) => err.error.kind.status_code(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
