//! # HTTP Transport
//!
//! A single catch-all route: every method on every path is decoded into a
//! verb, path, query map and JSON body, handed to the
//! [`RequestOrchestrator`](crate::orchestrator::RequestOrchestrator), and the
//! resulting envelope is written back with its status code.

pub mod config;
pub mod server;

pub use config::HttpServerConfig;
pub use server::{HttpServer, REQUEST_ID_HEADER};
