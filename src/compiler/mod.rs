//! # Query Compiler
//!
//! Deterministic mapping from a routed request to an injection-safe,
//! parameterized data-access operation.

pub mod compiler;
pub mod errors;
pub mod operation;

pub use compiler::QueryCompiler;
pub use errors::{CompileError, CompileResult};
pub use operation::{CompiledOperation, OperationKind, Param, Predicate};
