//! # Request Orchestrator
//!
//! The single public entry point. Each call walks
//! `Received -> Routed -> Compiled -> Executed -> Responded`; the first
//! failing stage moves it to `Errored` and short-circuits the rest.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::compiler::QueryCompiler;
use crate::errors::ErrorKind;
use crate::executor::{ExecError, ExecOutcome, Executor};
use crate::router::{PathRouter, Verb};
use crate::schema::SchemaRegistry;

use super::request::RequestDescriptor;
use super::response::{
    DeleteResponse, ListResponse, Payload, ResponseEnvelope, SingleResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Received,
    Routed,
    Compiled,
    Executed,
    Responded,
    Errored,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct Call {
    state: CallState,
}

impl Call {
    fn received() -> Self {
        debug!(state = %CallState::Received, "call state");
        Self {
            state: CallState::Received,
        }
    }

    fn advance(&mut self, next: CallState) {
        debug!(from = %self.state, to = %next, "call state");
        self.state = next;
    }

    fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) -> ResponseEnvelope {
        debug!(from = %self.state, kind = %kind, "call errored");
        self.state = CallState::Errored;
        ResponseEnvelope::error(kind, message)
    }
}

pub struct RequestOrchestrator {
    router: PathRouter,
    compiler: QueryCompiler,
    executor: Executor,
}

impl RequestOrchestrator {
    pub fn new(registry: Arc<SchemaRegistry>, executor: Executor) -> Self {
        Self {
            router: PathRouter::new(registry),
            compiler: QueryCompiler::new(),
            executor,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.router.registry()
    }

    /// Handle one call end to end
    pub async fn handle(
        &self,
        verb: Verb,
        path: &str,
        query: &HashMap<String, String>,
        body: Option<Value>,
    ) -> ResponseEnvelope {
        let mut call = Call::received();

        let shape = match self.router.route(verb, path, query) {
            Ok(shape) => shape,
            Err(err) => return call.fail(err.kind(), err.to_string()),
        };
        let request = RequestDescriptor::new(verb, shape, body);
        call.advance(CallState::Routed);

        let op = match self
            .compiler
            .compile(&request.shape, request.verb, request.body.as_ref())
        {
            Ok(op) => op,
            Err(err) => return call.fail(err.kind(), err.to_string()),
        };
        call.advance(CallState::Compiled);

        let outcome = match self.executor.execute(op).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if !matches!(err, ExecError::NotFound) {
                    warn!(
                        resource = %request.shape.resource.name,
                        verb = %request.verb,
                        error = %err,
                        "store operation failed"
                    );
                }
                return call.fail(err.kind(), err.public_message());
            }
        };
        call.advance(CallState::Executed);

        let envelope = Self::shape_response(&request, outcome);
        call.advance(CallState::Responded);
        envelope
    }

    fn shape_response(request: &RequestDescriptor, outcome: ExecOutcome) -> ResponseEnvelope {
        let payload = match (request.verb, outcome) {
            (_, ExecOutcome::Rows(rows)) => Payload::List(ListResponse::new(
                rows,
                request.shape.pagination.page,
                request.shape.pagination.page_size,
            )),
            (Verb::Create, ExecOutcome::Record(data)) => Payload::Created(SingleResponse { data }),
            (_, ExecOutcome::Record(data)) => Payload::Single(SingleResponse { data }),
            (_, ExecOutcome::Affected(_)) => Payload::Deleted(DeleteResponse::success()),
        };
        ResponseEnvelope::Success(payload)
    }
}
