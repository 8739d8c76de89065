//! crudgate - a deterministic resource router
//!
//! Maps an HTTP verb, path, query, and JSON body onto one parameterized
//! CRUD statement against a relational store. No free-form SQL ever
//! reaches the store.
//!
//! Request flow:
//! `router` -> `compiler` -> `executor`, composed by `orchestrator` and
//! exposed over HTTP by `http_server`.

pub mod cli;
pub mod compiler;
pub mod errors;
pub mod executor;
pub mod http_server;
pub mod observability;
pub mod orchestrator;
pub mod router;
pub mod schema;
