//! Route groups for organizing related routes
//!
//! A group prefixes every path registered through it and prepends its
//! middleware to the route's chain. Groups nest: prefixes concatenate and
//! middleware chains concatenate outer to inner.

use super::pattern::join_paths;
use super::registry::RouteRegistry;
use super::HttpMethod;
use crate::errors::RouteResult;
use crate::middleware::{Handler, Middleware};
use std::sync::Arc;

/// Scoped registrar returned by [`RouteRegistry::group`]
pub struct RouteGroup<'r> {
    registry: &'r mut RouteRegistry,
    prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(registry: &'r mut RouteRegistry, prefix: String, middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            registry,
            prefix,
            middleware,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Add middleware for routes registered on this group from now on
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Start a nested group
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        RouteGroup::new(
            &mut *self.registry,
            join_paths(&self.prefix, prefix),
            self.middleware.clone(),
        )
    }

    /// Register a handler for one method
    pub fn route<H: Handler + 'static>(&mut self, method: HttpMethod, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.register(Some(method), path, handler)
    }

    pub fn get<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.route(HttpMethod::GET, path, handler)
    }

    pub fn post<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.route(HttpMethod::POST, path, handler)
    }

    pub fn put<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.route(HttpMethod::PUT, path, handler)
    }

    pub fn patch<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.route(HttpMethod::PATCH, path, handler)
    }

    pub fn delete<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.route(HttpMethod::DELETE, path, handler)
    }

    pub fn head<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.route(HttpMethod::HEAD, path, handler)
    }

    pub fn options<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.route(HttpMethod::OPTIONS, path, handler)
    }

    /// Register a handler for every method
    pub fn all<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.register(None, path, handler)
    }

    fn register<H: Handler + 'static>(&mut self, method: Option<HttpMethod>, path: &str, handler: H) -> RouteResult<&mut Self> {
        let full_path = join_paths(&self.prefix, path);
        self.registry
            .register(method, &full_path, Arc::new(handler), self.middleware.clone())?;
        Ok(self)
    }
}
