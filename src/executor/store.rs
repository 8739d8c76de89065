//! SQLite connector helpers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use rusqlite::{Connection, OpenFlags, ToSql};
use tracing::info;

use crate::schema::{ScalarValue, SchemaRegistry};

use super::pool::Pool;

pub struct SqliteConn {
    conn: Connection,
}

impl SqliteConn {
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, rusqlite::Error> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(busy_timeout)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

pub fn sqlite_pool(path: &Path, pool_size: usize, busy_timeout: Duration) -> Arc<Pool<SqliteConn>> {
    let path = path.to_path_buf();
    Pool::new(pool_size, move || {
        SqliteConn::open(&path, busy_timeout).map_err(|e| e.to_string())
    })
}

/// Create the table of every registered resource if it does not exist yet.
///
/// Not part of request handling; used by `crudgate init` and tests.
pub fn bootstrap(path: &Path, registry: &SchemaRegistry) -> Result<(), rusqlite::Error> {
    let conn = Connection::open(path)?;
    for resource in registry.resources() {
        conn.execute(&resource.create_table_sql(), [])?;
        info!(resource = %resource.name, "table ready");
    }
    Ok(())
}

impl ToSql for ScalarValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            ScalarValue::Null => ToSqlOutput::Owned(SqlValue::Null),
            ScalarValue::Int(i) => ToSqlOutput::from(*i),
            ScalarValue::Text(s) => ToSqlOutput::from(s.as_str()),
            ScalarValue::Real(f) => ToSqlOutput::from(*f),
            ScalarValue::Bool(b) => ToSqlOutput::from(*b),
        })
    }
}
