//! # Path Router
//!
//! Turns an opaque path plus verb and query parameters into a typed
//! [`RequestShape`]: resource, optional identifier, page selection.

pub mod errors;
pub mod pagination;
pub mod path;
pub mod verb;

pub use errors::{RouteError, RouteResult};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use path::{PathRouter, RequestShape};
pub use verb::Verb;
