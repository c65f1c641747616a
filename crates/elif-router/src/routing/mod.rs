//! HTTP routing system for elif.rs
//!
//! This module provides the trie router:
//! - Route pattern parsing (`:param`, `:param(regex)`, `:param<named>`, `*wildcard`)
//! - Per-segment matching and constraint evaluation
//! - A prefix trie with backtracking lookup and fixed priority
//! - A registry with one trie per method, groups and mounting

pub mod constraint;
pub mod group;
pub mod lookup;
pub mod params;
pub mod pattern;
pub mod registry;
pub mod segment;
pub mod trie;

pub use constraint::{validate, Constraint, ConstraintTable};
pub use group::RouteGroup;
pub use lookup::{AllowedMethods, RouteLookup, RouteMatch};
pub use params::{ParamError, PathParams};
pub use pattern::RoutePattern;
pub use registry::RouteRegistry;
pub use segment::{match_segment, SegmentKind, SegmentMatch};
pub use trie::{RouteTrie, TrieMatch};

use crate::errors::RouteError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// HTTP methods supported by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
    TRACE,
}

impl HttpMethod {
    /// Every supported method, in `Allow` header order
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::GET,
        HttpMethod::HEAD,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::OPTIONS,
        HttpMethod::TRACE,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
        }
    }

    /// Position in `Allow` header output
    pub(crate) fn order(&self) -> u8 {
        match self {
            HttpMethod::GET => 0,
            HttpMethod::HEAD => 1,
            HttpMethod::POST => 2,
            HttpMethod::PUT => 3,
            HttpMethod::DELETE => 4,
            HttpMethod::PATCH => 5,
            HttpMethod::OPTIONS => 6,
            HttpMethod::TRACE => 7,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "PATCH" => Ok(HttpMethod::PATCH),
            "HEAD" => Ok(HttpMethod::HEAD),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "TRACE" => Ok(HttpMethod::TRACE),
            other => Err(RouteError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl TryFrom<&axum::http::Method> for HttpMethod {
    type Error = RouteError;

    fn try_from(method: &axum::http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<HttpMethod> for axum::http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => axum::http::Method::GET,
            HttpMethod::POST => axum::http::Method::POST,
            HttpMethod::PUT => axum::http::Method::PUT,
            HttpMethod::DELETE => axum::http::Method::DELETE,
            HttpMethod::PATCH => axum::http::Method::PATCH,
            HttpMethod::HEAD => axum::http::Method::HEAD,
            HttpMethod::OPTIONS => axum::http::Method::OPTIONS,
            HttpMethod::TRACE => axum::http::Method::TRACE,
        }
    }
}

/// Route metadata for introspection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteInfo {
    /// `None` for routes registered with `all()`
    pub method: Option<HttpMethod>,
    pub path: String,
    pub params: Vec<String>,
    /// Names of the group-scoped middleware, outer to inner
    pub middleware: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::GET);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::PATCH);
        assert!("get".parse::<HttpMethod>().is_err());
        assert!("BREW".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_axum_method_conversion() {
        let method = HttpMethod::try_from(&axum::http::Method::DELETE).unwrap();
        assert_eq!(method, HttpMethod::DELETE);
        assert_eq!(axum::http::Method::from(method), axum::http::Method::DELETE);

        let custom = axum::http::Method::from_bytes(b"PURGE").unwrap();
        assert!(HttpMethod::try_from(&custom).is_err());
    }
}
