//! # Executor Errors
//!
//! Store failures are classified into four kinds. The attached detail
//! strings are for logs only; callers see [`ExecError::public_message`].

use thiserror::Error;

use crate::errors::ErrorKind;

/// Result type for store operations
pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// No row matched an item-level operation
    #[error("Record not found")]
    NotFound,

    /// Constraint violation in the store
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// Any other store failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Round trip exceeded the statement timeout or was cancelled
    #[error("Store round trip timed out")]
    Timeout,
}

impl ExecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::NotFound => ErrorKind::NotFound,
            ExecError::Conflict(_) => ErrorKind::Conflict,
            ExecError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            ExecError::Timeout => ErrorKind::Timeout,
        }
    }

    /// Message safe to return to callers
    pub fn public_message(&self) -> &'static str {
        match self {
            ExecError::NotFound => "Record not found",
            ExecError::Conflict(_) => "Record conflicts with existing data",
            ExecError::StoreUnavailable(_) => "The backing store is unavailable",
            ExecError::Timeout => "The backing store did not respond in time",
        }
    }

    /// Whether one more attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecError::StoreUnavailable(_))
    }
}

impl From<rusqlite::Error> for ExecError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match &err {
            rusqlite::Error::QueryReturnedNoRows => ExecError::NotFound,
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                ErrorCode::ConstraintViolation => ExecError::Conflict(err.to_string()),
                ErrorCode::OperationInterrupted => ExecError::Timeout,
                _ => ExecError::StoreUnavailable(err.to_string()),
            },
            _ => ExecError::StoreUnavailable(err.to_string()),
        }
    }
}
