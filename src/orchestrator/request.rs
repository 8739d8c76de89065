//! # Request Descriptor

use serde_json::Value;

use crate::router::{RequestShape, Verb};

/// One decoded call, owned by the orchestrator for its duration
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub verb: Verb,
    pub shape: RequestShape,

    /// Decoded body; always `None` for READ and DELETE
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(verb: Verb, shape: RequestShape, body: Option<Value>) -> Self {
        Self {
            verb,
            shape,
            body: body.filter(|_| verb.takes_body()),
        }
    }
}
