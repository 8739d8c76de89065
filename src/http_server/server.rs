//! # HTTP Server
//!
//! Axum server with one fallback handler that accepts every path and method.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::ErrorKind;
use crate::orchestrator::{RequestOrchestrator, ResponseEnvelope};
use crate::router::Verb;

use super::config::HttpServerConfig;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

type ServerState = Arc<RequestOrchestrator>;

/// HTTP server for the resource router
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, orchestrator: RequestOrchestrator) -> Self {
        let router = Self::build_router(&config, Arc::new(orchestrator));
        Self { config, router }
    }

    /// Build the catch-all router
    fn build_router(config: &HttpServerConfig, state: ServerState) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

/// Decode one HTTP request and run it through the orchestrator
async fn dispatch(
    State(orchestrator): State<ServerState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4().simple().to_string();
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri.path()
    );

    async move {
        let envelope = match decode(&method, &body) {
            Ok((verb, body)) => orchestrator.handle(verb, uri.path(), &query, body).await,
            Err(envelope) => envelope,
        };

        info!(
            status = envelope.status_code().as_u16(),
            kind = envelope.error_kind().map(|k| k.as_str()).unwrap_or("ok"),
            "handled"
        );

        let mut response = envelope.into_response();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Map the method onto a verb and decode the body for verbs that take one
fn decode(method: &Method, body: &[u8]) -> Result<(Verb, Option<Value>), ResponseEnvelope> {
    let verb = Verb::from_method(method)
        .map_err(|e| ResponseEnvelope::error(e.kind(), e.to_string()))?;

    if !verb.takes_body() || body.iter().all(u8::is_ascii_whitespace) {
        return Ok((verb, None));
    }

    let value = serde_json::from_slice(body).map_err(|e| {
        ResponseEnvelope::error(ErrorKind::InvalidBody, format!("Request body is not valid JSON: {}", e))
    })?;
    Ok((verb, Some(value)))
}
