//! Observability for crudgate
//!
//! Structured logging through `tracing`. Request spans carry `request_id`,
//! `method` and `path`; store spans never carry bound values.

mod logging;

pub use logging::{init_logging, LogLevel};
