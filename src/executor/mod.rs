//! Data access executor for crudgate
//!
//! Owns the backing store: a bounded SQLite connection pool, the
//! per-operation transaction boundary, round-trip timeouts, and the mapping
//! from store failures to [`ExecError`] kinds.
//!
//! # Invariants
//!
//! - A connection is held for one operation attempt only
//! - Every non-success exit rolls the transaction back
//! - Only `StoreUnavailable` is retried, at most once
//! - Bound values are never logged

mod errors;
mod executor;
mod pool;
mod store;

pub use errors::{ExecError, ExecResult};
pub use executor::{ExecOutcome, Executor, ExecutorConfig, Record};
pub use pool::{AcquireError, Pool, Pooled};
pub use store::{bootstrap, sqlite_pool, SqliteConn};
