//! CRUD Scenario Tests
//!
//! End-to-end calls through the orchestrator against a real SQLite file:
//! - Created records are visible to later reads
//! - Item reads return exactly the stored record
//! - Pagination is stable over identifier order
//! - Rejected requests leave the store untouched

use std::collections::HashMap;
use std::sync::Arc;

use crudgate::errors::ErrorKind;
use crudgate::executor::{bootstrap, Executor, ExecutorConfig};
use crudgate::orchestrator::RequestOrchestrator;
use crudgate::router::Verb;
use crudgate::schema::SchemaRegistry;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (TempDir, RequestOrchestrator) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("crud.db");
    let registry = Arc::new(SchemaRegistry::builtin().unwrap());
    bootstrap(&path, &registry).unwrap();
    let executor = Executor::open(&path, ExecutorConfig::default());
    (tmp, RequestOrchestrator::new(registry, executor))
}

fn no_query() -> HashMap<String, String> {
    HashMap::new()
}

fn page(page: u64, size: u64) -> HashMap<String, String> {
    let mut query = HashMap::new();
    query.insert("page".to_string(), page.to_string());
    query.insert("pageSize".to_string(), size.to_string());
    query
}

fn song(title: &str) -> Value {
    json!({
        "artist": "Miles Davis",
        "album": "Kind of Blue",
        "title": title,
        "duration": 545,
        "spotifyLink": format!("https://open.spotify.com/track/{}", title)
    })
}

async fn create(o: &RequestOrchestrator, title: &str) -> Value {
    let envelope = o.handle(Verb::Create, "/music", &no_query(), Some(song(title))).await;
    assert_eq!(envelope.status_code().as_u16(), 201);
    envelope.to_json()["data"].clone()
}

// =============================================================================
// Music Scenario
// =============================================================================

/// Create, list, and miss: the canonical walkthrough.
#[tokio::test]
async fn test_music_walkthrough() {
    let (_tmp, o) = setup();

    let created = create(&o, "So What").await;
    assert!(created["id"].is_i64());
    assert_eq!(created["title"], "So What");

    let list = o.handle(Verb::Read, "/music", &no_query(), None).await.to_json();
    assert_eq!(list["count"], 1);
    assert_eq!(list["page"], 0);
    assert_eq!(list["pageSize"], 20);
    assert_eq!(list["data"][0], created);

    let missing = o.handle(Verb::Read, "/music/999", &no_query(), None).await;
    assert_eq!(missing.error_kind(), Some(ErrorKind::NotFound));
    assert_eq!(missing.status_code().as_u16(), 404);
}

/// An item read returns the record exactly as it was created.
#[tokio::test]
async fn test_item_read_round_trips_record() {
    let (_tmp, o) = setup();
    let created = create(&o, "Blue in Green").await;
    let id = created["id"].as_i64().unwrap();

    let read = o
        .handle(Verb::Read, &format!("/music/{}", id), &no_query(), None)
        .await
        .to_json();
    assert_eq!(read["data"], created);
}

/// A null for a required field counts as missing.
#[tokio::test]
async fn test_null_required_field_is_missing() {
    let (_tmp, o) = setup();
    let mut body = song("Freddie Freeloader");
    body["spotifyLink"] = Value::Null;

    let envelope = o.handle(Verb::Create, "/music", &no_query(), Some(body)).await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::MissingField));
}

// =============================================================================
// Pagination
// =============================================================================

/// Zero-based pages partition the collection in identifier order, with no overlap.
#[tokio::test]
async fn test_pagination_is_stable() {
    let (_tmp, o) = setup();
    for title in ["a", "b", "c", "d"] {
        create(&o, title).await;
    }

    let first = o.handle(Verb::Read, "/music", &page(0, 2), None).await.to_json();
    let second = o.handle(Verb::Read, "/music", &page(1, 2), None).await.to_json();
    let third = o.handle(Verb::Read, "/music", &page(2, 2), None).await.to_json();

    let titles = |v: &Value| -> Vec<String> {
        v["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(titles(&first), vec!["a", "b"]);
    assert_eq!(titles(&second), vec!["c", "d"]);
    assert_eq!(third["count"], 0);

    // Same query, same answer
    let again = o.handle(Verb::Read, "/music", &page(0, 2), None).await.to_json();
    assert_eq!(again, first);
}

/// Oversized pages are clamped rather than rejected.
#[tokio::test]
async fn test_page_size_is_clamped() {
    let (_tmp, o) = setup();
    let list = o.handle(Verb::Read, "/music", &page(0, 5000), None).await.to_json();
    assert_eq!(list["pageSize"], 100);
}

#[tokio::test]
async fn test_invalid_pagination_rejected() {
    let (_tmp, o) = setup();
    let envelope = o.handle(Verb::Read, "/music", &page(0, 0), None).await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::InvalidPagination));
}

// =============================================================================
// Rejected Requests
// =============================================================================

/// A create missing a required field writes nothing.
#[tokio::test]
async fn test_missing_field_writes_no_row() {
    let (_tmp, o) = setup();
    let envelope = o
        .handle(Verb::Create, "/music", &no_query(), Some(json!({"artist": "A"})))
        .await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::MissingField));
    assert_eq!(envelope.status_code().as_u16(), 400);

    let list = o.handle(Verb::Read, "/music", &no_query(), None).await.to_json();
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_type_mismatch_and_unknown_field() {
    let (_tmp, o) = setup();

    let mut wrong_type = song("x");
    wrong_type["duration"] = json!("long");
    let envelope = o.handle(Verb::Create, "/music", &no_query(), Some(wrong_type)).await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::TypeMismatch));

    let mut extra = song("x");
    extra["genre"] = json!("jazz");
    let envelope = o.handle(Verb::Create, "/music", &no_query(), Some(extra)).await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::UnknownField));
}

/// Deleting twice: the second call finds nothing.
#[tokio::test]
async fn test_delete_twice() {
    let (_tmp, o) = setup();
    let id = create(&o, "All Blues").await["id"].as_i64().unwrap();
    let path = format!("/music/{}", id);

    let first = o.handle(Verb::Delete, &path, &no_query(), None).await;
    assert_eq!(first.to_json(), json!({"deleted": true}));

    let second = o.handle(Verb::Delete, &path, &no_query(), None).await;
    assert_eq!(second.error_kind(), Some(ErrorKind::NotFound));
}

/// Partial update touches only the named fields.
#[tokio::test]
async fn test_partial_update() {
    let (_tmp, o) = setup();
    let created = create(&o, "Flamenco Sketches").await;
    let path = format!("/music/{}", created["id"]);

    let updated = o
        .handle(Verb::Update, &path, &no_query(), Some(json!({"duration": 566})))
        .await
        .to_json();
    assert_eq!(updated["data"]["duration"], 566);
    assert_eq!(updated["data"]["title"], created["title"]);

    let empty = o.handle(Verb::Update, &path, &no_query(), Some(json!({}))).await;
    assert_eq!(empty.error_kind(), Some(ErrorKind::EmptyUpdate));
}

/// Unknown resources are rejected before anything else, for every verb.
#[tokio::test]
async fn test_unknown_resource_for_every_verb() {
    let (_tmp, o) = setup();
    let cases = [
        (Verb::Create, "/albums", Some(json!({"title": "x"}))),
        (Verb::Read, "/albums", None),
        (Verb::Read, "/albums/1", None),
        (Verb::Update, "/albums/1", Some(json!({"title": "x"}))),
        (Verb::Delete, "/albums/1", None),
    ];
    for (verb, path, body) in cases {
        let envelope = o.handle(verb, path, &no_query(), body).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::UnknownResource), "{} {}", verb, path);
    }
}

#[tokio::test]
async fn test_invalid_identifier_and_malformed_path() {
    let (_tmp, o) = setup();

    let envelope = o.handle(Verb::Read, "/music/abc", &no_query(), None).await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::InvalidIdentifier));

    let envelope = o.handle(Verb::Read, "/music/1/extra", &no_query(), None).await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::MalformedPath));
}
