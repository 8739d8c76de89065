//! HTTP Dispatch Tests
//!
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use crudgate::executor::{bootstrap, Executor, ExecutorConfig};
use crudgate::http_server::{HttpServer, HttpServerConfig, REQUEST_ID_HEADER};
use crudgate::orchestrator::RequestOrchestrator;
use crudgate::schema::SchemaRegistry;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> (TempDir, Router) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("http.db");
    let registry = Arc::new(SchemaRegistry::builtin().unwrap());
    bootstrap(&path, &registry).unwrap();
    let orchestrator = RequestOrchestrator::new(
        registry,
        Executor::open(&path, ExecutorConfig::default()),
    );
    let router = HttpServer::new(HttpServerConfig::default(), orchestrator).router();
    (tmp, router)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

const SONG: &str = r#"{"artist":"Nina Simone","album":"Pastel Blues","title":"Sinnerman","duration":622,"spotifyLink":"https://open.spotify.com/track/sinnerman"}"#;

#[tokio::test]
async fn test_create_then_read() {
    let (_tmp, app) = app();

    let (status, created) = send(&app, "POST", "/music", Some(SONG)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, read) = send(&app, "GET", &format!("/music/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"]["title"], "Sinnerman");

    let (status, list) = send(&app, "GET", "/music?page=0&pageSize=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pageSize"], 5);
    assert_eq!(list["count"], 1);
}

#[tokio::test]
async fn test_put_and_patch_both_update() {
    let (_tmp, app) = app();
    send(&app, "POST", "/music", Some(SONG)).await;

    let (status, body) = send(&app, "PUT", "/music/1", Some(r#"{"duration": 600}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duration"], 600);

    let (status, body) = send(&app, "PATCH", "/music/1", Some(r#"{"duration": 601}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duration"], 601);
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let (_tmp, app) = app();
    send(&app, "POST", "/music", Some(SONG)).await;

    let (status, body) = send(&app, "DELETE", "/music/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted": true}));

    let (status, body) = send(&app, "DELETE", "/music/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "NotFound");
}

#[tokio::test]
async fn test_error_statuses() {
    let (_tmp, app) = app();

    let cases = [
        ("GET", "/nothing", None, StatusCode::NOT_FOUND, "UnknownResource"),
        ("GET", "/music/x", None, StatusCode::BAD_REQUEST, "InvalidIdentifier"),
        ("GET", "/music?page=-1", None, StatusCode::BAD_REQUEST, "InvalidPagination"),
        ("POST", "/music", Some("{title"), StatusCode::BAD_REQUEST, "InvalidBody"),
        ("POST", "/music", Some("[1, 2]"), StatusCode::BAD_REQUEST, "InvalidBody"),
        ("POST", "/music", Some(r#"{"title": "x"}"#), StatusCode::BAD_REQUEST, "MissingField"),
        ("POST", "/music/1", Some(SONG), StatusCode::METHOD_NOT_ALLOWED, "UnexpectedIdentifier"),
        ("DELETE", "/music", None, StatusCode::METHOD_NOT_ALLOWED, "MissingIdentifier"),
        ("TRACE", "/music", None, StatusCode::METHOD_NOT_ALLOWED, "UnsupportedMethod"),
    ];

    for (method, uri, body, expected_status, expected_kind) in cases {
        let (status, value) = send(&app, method, uri, body).await;
        assert_eq!(status, expected_status, "{} {}", method, uri);
        assert_eq!(value["error"]["kind"], expected_kind, "{} {}", method, uri);
        assert!(value["error"]["message"].is_string());
        assert!(value.get("data").is_none());
    }
}

#[tokio::test]
async fn test_head_is_unsupported() {
    let (_tmp, app) = app();
    let (status, _) = send(&app, "HEAD", "/music", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_request_id_header() {
    let (_tmp, app) = app();
    let request = Request::builder()
        .uri("/music")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header")
        .to_str()
        .unwrap();
    assert_eq!(id.len(), 32);
}
