//! Data access executor
//!
//! Runs one compiled operation per call:
//!
//! 1. Acquire a pooled connection (bounded wait)
//! 2. Open a transaction
//! 3. Run the statement with bound parameters
//! 4. Commit; every other exit path rolls back on drop
//!
//! Each attempt is bounded by the statement timeout. On expiry the running
//! statement is interrupted and the attempt waits for the worker to stop, so
//! a write is never reported as timed out once it has committed. When the
//! caller drops the future the worker is interrupted without waiting; work
//! not yet committed is rolled back. `StoreUnavailable` is retried once after
//! a fixed delay.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, InterruptHandle, Row};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::compiler::{CompiledOperation, OperationKind};
use crate::schema::{FieldType, ResourceDef};

use super::errors::{ExecError, ExecResult};
use super::pool::{AcquireError, Pool};
use super::store::{sqlite_pool, SqliteConn};

/// A stored record, keyed by field name
pub type Record = Map<String, Value>;

/// What a successful operation produced
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// Collection read, possibly empty
    Rows(Vec<Record>),

    /// Item read, created or updated record
    Record(Record),

    /// Rows removed by a delete
    Affected(usize),
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum open connections
    pub pool_size: usize,

    /// Bound on one attempt, including pool acquisition
    pub statement_timeout: Duration,

    /// How long SQLite waits on a locked database before failing
    pub busy_timeout: Duration,

    /// Pause before the single retry
    pub retry_delay: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            statement_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_millis(100),
            retry_delay: Duration::from_millis(100),
        }
    }
}

/// Shared between an attempt's future and its blocking worker
#[derive(Default)]
struct Cancellation {
    cancelled: AtomicBool,
    handle: Mutex<Option<InterruptHandle>>,
}

impl Cancellation {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = handle.as_ref() {
            handle.interrupt();
        }
    }

    fn attach(&self, conn: &Connection) {
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(conn.get_interrupt_handle());
    }

    fn detach(&self) {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Cancels the attempt unless disarmed first
struct CancelOnDrop {
    cancellation: Arc<Cancellation>,
    armed: bool,
}

impl CancelOnDrop {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.cancellation.cancel();
        }
    }
}

pub struct Executor {
    pool: Arc<Pool<SqliteConn>>,
    config: ExecutorConfig,
}

impl Executor {
    /// Executor over the SQLite database at `path`
    pub fn open(path: &Path, config: ExecutorConfig) -> Self {
        let pool = sqlite_pool(path, config.pool_size, config.busy_timeout);
        Self { pool, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute an operation, retrying once on `StoreUnavailable`
    pub async fn execute(&self, op: CompiledOperation) -> ExecResult<ExecOutcome> {
        let op = Arc::new(op);
        debug!(op = %op.kind, resource = %op.resource.name, "executing");

        match self.attempt(Arc::clone(&op)).await {
            Err(err) if err.is_retryable() => {
                warn!(
                    op = %op.kind,
                    resource = %op.resource.name,
                    error = %err,
                    delay_ms = self.config.retry_delay.as_millis() as u64,
                    "store unavailable, retrying once"
                );
                tokio::time::sleep(self.config.retry_delay).await;
                let result = self.attempt(op).await;
                if let Err(err) = &result {
                    warn!(error = %err, "retry failed");
                }
                result
            }
            other => other,
        }
    }

    async fn attempt(&self, op: Arc<CompiledOperation>) -> ExecResult<ExecOutcome> {
        let cancellation = Arc::new(Cancellation::default());
        let guard = CancelOnDrop {
            cancellation: Arc::clone(&cancellation),
            armed: true,
        };

        let pool = Arc::clone(&self.pool);
        let timeout = self.config.statement_timeout;
        let mut worker = tokio::task::spawn_blocking(move || {
            run_attempt(&pool, timeout, &op, &cancellation)
        });

        // Dropping `guard` before the worker finishes interrupts it
        let result = match tokio::time::timeout(timeout, &mut worker).await {
            Ok(joined) => joined.unwrap_or_else(|join_err| {
                Err(ExecError::StoreUnavailable(format!(
                    "store worker failed: {}",
                    join_err
                )))
            }),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "store round trip timed out");
                guard.cancellation.cancel();
                // A COMMIT already waiting on a lock is not interruptible;
                // report whatever the worker actually did
                match worker.await {
                    Ok(Ok(outcome)) => {
                        warn!("store round trip completed after the timeout fired");
                        Ok(outcome)
                    }
                    Ok(Err(ExecError::NotFound)) => Err(ExecError::NotFound),
                    Ok(Err(ExecError::Conflict(msg))) => Err(ExecError::Conflict(msg)),
                    _ => Err(ExecError::Timeout),
                }
            }
        };

        guard.disarm();
        result
    }
}

fn run_attempt(
    pool: &Arc<Pool<SqliteConn>>,
    timeout: Duration,
    op: &CompiledOperation,
    cancellation: &Cancellation,
) -> ExecResult<ExecOutcome> {
    let conn = pool
        .acquire_with_cancel(timeout, || cancellation.is_cancelled())
        .map_err(|err| match err {
            AcquireError::Timeout | AcquireError::Cancelled => ExecError::Timeout,
            AcquireError::Connect(msg) => ExecError::StoreUnavailable(msg),
        })?;

    cancellation.attach(conn.connection());
    let result = if cancellation.is_cancelled() {
        Err(ExecError::Timeout)
    } else {
        run_in_transaction(conn.connection(), op, cancellation)
    };
    cancellation.detach();

    if matches!(result, Err(ExecError::StoreUnavailable(_))) {
        conn.discard();
    }
    result
}

fn run_in_transaction(
    conn: &Connection,
    op: &CompiledOperation,
    cancellation: &Cancellation,
) -> ExecResult<ExecOutcome> {
    let tx = conn.unchecked_transaction()?;
    let outcome = run_statement(&tx, op)?;

    if cancellation.is_cancelled() {
        return Err(ExecError::Timeout);
    }
    tx.commit()?;
    Ok(outcome)
}

fn run_statement(conn: &Connection, op: &CompiledOperation) -> ExecResult<ExecOutcome> {
    let sql = op.sql();
    let bindings = op.bindings();
    let params = rusqlite::params_from_iter(bindings.iter());
    let mut stmt = conn.prepare_cached(&sql)?;
    let resource = op.resource.as_ref();

    match op.kind {
        OperationKind::Select => {
            let rows = stmt
                .query_map(params, |row| read_record(row, resource))?
                .collect::<Result<Vec<_>, _>>()?;
            if op.is_item() {
                rows.into_iter()
                    .next()
                    .map(ExecOutcome::Record)
                    .ok_or(ExecError::NotFound)
            } else {
                Ok(ExecOutcome::Rows(rows))
            }
        }
        // RETURNING yields no row when an update matches nothing
        OperationKind::Insert | OperationKind::Update => {
            let record = stmt.query_row(params, |row| read_record(row, resource))?;
            Ok(ExecOutcome::Record(record))
        }
        OperationKind::Delete => match stmt.execute(params)? {
            0 => Err(ExecError::NotFound),
            n => Ok(ExecOutcome::Affected(n)),
        },
    }
}

fn read_record(row: &Row<'_>, resource: &ResourceDef) -> rusqlite::Result<Record> {
    let mut record = Map::new();
    for (idx, field) in resource.fields.iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) if field.field_type == FieldType::Bool => Value::Bool(n != 0),
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(_) => {
                return Err(rusqlite::Error::InvalidColumnType(
                    idx,
                    field.name.clone(),
                    rusqlite::types::Type::Blob,
                ))
            }
        };
        record.insert(field.name.clone(), value);
    }
    Ok(record)
}
