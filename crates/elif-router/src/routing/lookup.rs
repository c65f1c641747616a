//! Lookup results

use super::params::PathParams;
use super::registry::Endpoint;
use super::HttpMethod;
use crate::middleware::Middleware;
use std::sync::Arc;

/// Result of a registry lookup
#[derive(Debug)]
pub enum RouteLookup<'r> {
    /// A route matched path and method
    Match(RouteMatch<'r>),
    /// The path matched, but only under other methods
    MethodNotAllowed { allowed: AllowedMethods },
    /// No route matched the path
    NotFound,
}

impl<'r> RouteLookup<'r> {
    pub fn is_match(&self) -> bool {
        matches!(self, RouteLookup::Match(_))
    }

    /// The match, if any
    pub fn into_match(self) -> Option<RouteMatch<'r>> {
        match self {
            RouteLookup::Match(m) => Some(m),
            _ => None,
        }
    }
}

/// A matched route with its captured parameters
#[derive(Debug)]
pub struct RouteMatch<'r> {
    pub(crate) endpoint: &'r Endpoint,
    pub(crate) params: PathParams,
}

impl<'r> RouteMatch<'r> {
    /// Captured parameters, left to right
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Canonical pattern of the matched route
    pub fn pattern(&self) -> &'r str {
        self.endpoint.pattern()
    }

    /// Method the route was registered under, `None` for `all()` routes
    pub fn method(&self) -> Option<HttpMethod> {
        self.endpoint.method()
    }

    /// Group-scoped middleware, outer to inner
    pub fn middleware(&self) -> &'r [Arc<dyn Middleware>] {
        self.endpoint.middleware()
    }

    pub fn into_params(self) -> PathParams {
        self.params
    }
}

/// Allowed methods for a matched path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods {
    methods: Vec<HttpMethod>,
}

impl AllowedMethods {
    /// Create a normalized allow list
    ///
    /// Adds `HEAD` if `GET` is present, then sorts and de-duplicates for
    /// stable output.
    pub fn new(mut methods: Vec<HttpMethod>) -> Self {
        if methods.contains(&HttpMethod::GET) && !methods.contains(&HttpMethod::HEAD) {
            methods.push(HttpMethod::HEAD);
        }
        Self::exact(methods)
    }

    /// Normalize without implying `HEAD`
    pub fn exact(mut methods: Vec<HttpMethod>) -> Self {
        methods.sort_by_key(HttpMethod::order);
        methods.dedup();
        Self { methods }
    }

    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    pub fn contains(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Format as an HTTP `Allow` header value
    pub fn header_value(&self) -> String {
        self.methods
            .iter()
            .map(HttpMethod::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
