//! CRUD verbs and their HTTP method mapping

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::Serialize;

use super::errors::{RouteError, RouteResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl Verb {
    /// Map an HTTP method onto a verb.
    ///
    /// GET reads, POST creates, PUT and PATCH both apply a partial update,
    /// DELETE deletes. Anything else is rejected.
    pub fn from_method(method: &Method) -> RouteResult<Self> {
        match *method {
            Method::GET => Ok(Verb::Read),
            Method::POST => Ok(Verb::Create),
            Method::PUT | Method::PATCH => Ok(Verb::Update),
            Method::DELETE => Ok(Verb::Delete),
            _ => Err(RouteError::UnsupportedMethod(method.to_string())),
        }
    }

    /// Whether requests with this verb carry a body
    pub fn takes_body(&self) -> bool {
        matches!(self, Verb::Create | Verb::Update)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "CREATE",
            Verb::Read => "READ",
            Verb::Update => "UPDATE",
            Verb::Delete => "DELETE",
        }
    }
}

impl FromStr for Verb {
    type Err = RouteError;

    /// Accepts HTTP method names (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = Method::from_bytes(s.to_ascii_uppercase().as_bytes())
            .map_err(|_| RouteError::UnsupportedMethod(s.to_string()))?;
        Self::from_method(&method)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
