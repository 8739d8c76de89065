//! # Request Orchestrator
//!
//! Composes Router -> Compiler -> Executor and shapes the outcome into a
//! [`ResponseEnvelope`].

pub mod handler;
pub mod request;
pub mod response;

pub use handler::RequestOrchestrator;
pub use request::RequestDescriptor;
pub use response::{
    DeleteResponse, ErrorBody, ErrorResponse, ListResponse, Payload, ResponseEnvelope,
    SingleResponse,
};
