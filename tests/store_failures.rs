//! Store Failure Tests
//!
//! Store-level failures surface as typed errors with the right status:
//! - Constraint violations are conflicts
//! - A locked store is unavailable after one retry
//! - A store that frees up before the retry succeeds
//! - A slow round trip times out and commits nothing
//! - A timeout is never reported for a write that committed
//! - A call dropped by its caller commits nothing

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crudgate::errors::ErrorKind;
use crudgate::executor::{bootstrap, Executor, ExecutorConfig};
use crudgate::orchestrator::RequestOrchestrator;
use crudgate::router::Verb;
use crudgate::schema::SchemaRegistry;
use rusqlite::Connection;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup(config: ExecutorConfig) -> (TempDir, PathBuf, RequestOrchestrator) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("failures.db");
    let registry = Arc::new(SchemaRegistry::builtin().unwrap());
    bootstrap(&path, &registry).unwrap();
    let orchestrator = RequestOrchestrator::new(registry, Executor::open(&path, config));
    (tmp, path, orchestrator)
}

fn song(link: &str) -> Value {
    json!({
        "artist": "Alice Coltrane",
        "album": "Journey in Satchidananda",
        "title": "Shiva-Loka",
        "duration": 400,
        "spotifyLink": link
    })
}

fn row_count(path: &Path) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.busy_timeout(Duration::from_secs(2)).unwrap();
    conn.query_row("SELECT COUNT(*) FROM music", [], |row| row.get(0))
        .unwrap()
}

/// Hold an exclusive lock on the database until the returned sender fires
/// or is dropped.
fn hold_exclusive_lock(path: &Path) -> mpsc::Sender<()> {
    let path = path.to_path_buf();
    let (locked_tx, locked_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    thread::spawn(move || {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("BEGIN EXCLUSIVE").unwrap();
        locked_tx.send(()).unwrap();
        let _ = release_rx.recv();
        conn.execute_batch("COMMIT").unwrap();
    });

    locked_rx.recv().unwrap();
    release_tx
}

/// Hold a read transaction, and with it a SHARED lock, for `hold`.
fn hold_read_lock(path: &Path, hold: Duration) -> thread::JoinHandle<()> {
    let path = path.to_path_buf();
    let (locked_tx, locked_rx) = mpsc::channel();

    let reader = thread::spawn(move || {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("BEGIN").unwrap();
        let _: i64 = conn
            .query_row("SELECT COUNT(*) FROM music", [], |row| row.get(0))
            .unwrap();
        locked_tx.send(()).unwrap();
        thread::sleep(hold);
        conn.execute_batch("COMMIT").unwrap();
    });

    locked_rx.recv().unwrap();
    reader
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_unique_violation_is_conflict() {
    let (_tmp, path, o) = setup(ExecutorConfig::default());
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE UNIQUE INDEX music_link ON music (\"spotifyLink\")")
        .unwrap();

    let first = o
        .handle(Verb::Create, "/music", &HashMap::new(), Some(song("link-1")))
        .await;
    assert!(first.is_success());

    let second = o
        .handle(Verb::Create, "/music", &HashMap::new(), Some(song("link-1")))
        .await;
    assert_eq!(second.error_kind(), Some(ErrorKind::Conflict));
    assert_eq!(second.status_code().as_u16(), 409);
    assert_eq!(row_count(&path), 1);
}

#[tokio::test]
async fn test_locked_store_is_unavailable_after_retry() {
    let (_tmp, path, o) = setup(ExecutorConfig {
        busy_timeout: Duration::from_millis(20),
        retry_delay: Duration::from_millis(20),
        statement_timeout: Duration::from_secs(2),
        ..ExecutorConfig::default()
    });
    let release = hold_exclusive_lock(&path);

    let envelope = o.handle(Verb::Read, "/music", &HashMap::new(), None).await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::StoreUnavailable));
    assert_eq!(envelope.status_code().as_u16(), 503);

    drop(release);
}

#[tokio::test]
async fn test_retry_recovers_when_lock_clears() {
    let (_tmp, path, o) = setup(ExecutorConfig {
        busy_timeout: Duration::from_millis(10),
        retry_delay: Duration::from_millis(400),
        statement_timeout: Duration::from_secs(2),
        ..ExecutorConfig::default()
    });
    let release = hold_exclusive_lock(&path);

    thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        let _ = release.send(());
    });

    let envelope = o
        .handle(Verb::Create, "/music", &HashMap::new(), Some(song("link-2")))
        .await;
    assert!(envelope.is_success(), "{:?}", envelope);
    assert_eq!(row_count(&path), 1);
}

#[tokio::test]
async fn test_slow_round_trip_times_out_without_commit() {
    let (_tmp, path, o) = setup(ExecutorConfig {
        busy_timeout: Duration::from_secs(1),
        statement_timeout: Duration::from_millis(100),
        ..ExecutorConfig::default()
    });
    let release = hold_exclusive_lock(&path);

    let envelope = o
        .handle(Verb::Create, "/music", &HashMap::new(), Some(song("link-3")))
        .await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::Timeout));
    assert_eq!(envelope.status_code().as_u16(), 504);

    drop(release);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(row_count(&path), 0);
}

/// COMMIT waiting on a reader cannot be interrupted; once it lands the call
/// must report success, and a reported timeout must mean nothing was written.
#[tokio::test]
async fn test_timeout_never_hides_a_committed_write() {
    let (_tmp, path, o) = setup(ExecutorConfig {
        busy_timeout: Duration::from_secs(2),
        statement_timeout: Duration::from_millis(100),
        ..ExecutorConfig::default()
    });
    let reader = hold_read_lock(&path, Duration::from_millis(400));

    let envelope = o
        .handle(Verb::Create, "/music", &HashMap::new(), Some(song("link-4")))
        .await;
    reader.join().unwrap();

    let rows = row_count(&path);
    assert_eq!(envelope.is_success(), rows == 1, "{:?} with {} rows", envelope, rows);
    if !envelope.is_success() {
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Timeout));
        assert_eq!(rows, 0);
    }
}

#[tokio::test]
async fn test_dropped_call_commits_nothing() {
    let (_tmp, path, o) = setup(ExecutorConfig {
        busy_timeout: Duration::from_secs(1),
        statement_timeout: Duration::from_secs(5),
        ..ExecutorConfig::default()
    });
    let release = hold_exclusive_lock(&path);

    let query = HashMap::new();
    let call = o.handle(Verb::Create, "/music", &query, Some(song("link-5")));
    let outcome = tokio::time::timeout(Duration::from_millis(100), call).await;
    assert!(outcome.is_err(), "call should still be waiting on the lock");

    drop(release);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(row_count(&path), 0);
}
