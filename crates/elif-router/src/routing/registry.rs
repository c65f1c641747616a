//! Route registry
//!
//! One [`RouteTrie`] per HTTP method plus a shared trie for routes
//! registered with [`RouteRegistry::all`]. The registry is built during
//! startup and is read-only once handed to a dispatcher.

use super::constraint::{Constraint, ConstraintTable};
use super::group::RouteGroup;
use super::lookup::{AllowedMethods, RouteLookup, RouteMatch};
use super::pattern::RoutePattern;
use super::trie::RouteTrie;
use super::{HttpMethod, RouteInfo};
use crate::config::RouterConfig;
use crate::errors::RouteResult;
use crate::middleware::{Handler, Middleware, Pipeline};
use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered route: handler, group middleware and the lazily composed
/// pipeline
pub struct Endpoint {
    method: Option<HttpMethod>,
    pattern: RoutePattern,
    canonical: String,
    handler: Arc<dyn Handler>,
    middleware: Vec<Arc<dyn Middleware>>,
    pipeline: OnceCell<Pipeline>,
}

impl Endpoint {
    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    pub fn pattern(&self) -> &str {
        &self.canonical
    }

    /// Group-scoped middleware, outer to inner
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// The composed pipeline, built on first use
    pub(crate) fn pipeline(&self, global: &[Arc<dyn Middleware>]) -> &Pipeline {
        self.pipeline.get_or_init(|| {
            let mut chain = Vec::with_capacity(global.len() + self.middleware.len());
            chain.extend(global.iter().cloned());
            chain.extend(self.middleware.iter().cloned());
            tracing::debug!(target: "elif::router", "Composed pipeline for {} with {} middleware", self.canonical, chain.len());
            Pipeline::compose(chain, self.handler.clone())
        })
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("pattern", &self.canonical)
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Route registry with per-method tries, groups and mounting
pub struct RouteRegistry {
    tries: HashMap<HttpMethod, RouteTrie<Endpoint>>,
    any: RouteTrie<Endpoint>,
    middleware: Vec<Arc<dyn Middleware>>,
    constraints: ConstraintTable,
    routes: Vec<RouteInfo>,
    config: RouterConfig,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            tries: HashMap::new(),
            any: RouteTrie::new(None),
            middleware: Vec::new(),
            constraints: ConstraintTable::new(),
            routes: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Make a named constraint available to `:name<constraint>` patterns
    ///
    /// Only affects routes registered afterwards.
    pub fn define_constraint<N: Into<String>>(&mut self, name: N, constraint: Constraint) -> &mut Self {
        self.constraints.define(name, constraint);
        self
    }

    /// Add registry-wide middleware
    ///
    /// Registry middleware wraps every matched route, outside any group
    /// middleware, regardless of when the route was registered.
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub(crate) fn global_middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Register a handler for one method
    pub fn route<H: Handler + 'static>(&mut self, method: HttpMethod, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.register(Some(method), path, Arc::new(handler), Vec::new())?;
        Ok(self)
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
    ///
    /// Method-specific routes take precedence over these.
    pub fn all<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
        self.register(None, path, Arc::new(handler), Vec::new())?;
        Ok(self)
    }

    /// Start a group sharing `prefix` and a middleware chain
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        RouteGroup::new(self, prefix.to_string(), Vec::new())
    }

    /// Graft every route of `other` under `prefix`
    ///
    /// Patterns are re-rooted at registration time, so mounted routes are
    /// ordinary trie entries. `other`'s registry middleware becomes the
    /// outermost group middleware of its routes.
    pub fn mount(&mut self, prefix: &str, other: RouteRegistry) -> RouteResult<&mut Self> {
        let prefix = RoutePattern::parse(prefix, &self.constraints)?;
        let RouteRegistry {
            tries,
            any,
            middleware: outer,
            ..
        } = other;

        let mut endpoints: Vec<Endpoint> = tries
            .into_values()
            .chain(std::iter::once(any))
            .flat_map(RouteTrie::into_values)
            .collect();
        // keep introspection output stable
        endpoints.sort_by(|a, b| a.canonical.cmp(&b.canonical).then(method_rank(a).cmp(&method_rank(b))));

        for endpoint in endpoints {
            let pattern = endpoint.pattern.prefixed(&prefix)?;
            let mut chain = outer.clone();
            chain.extend(endpoint.middleware);
            self.insert(endpoint.method, pattern, endpoint.handler, chain)?;
        }

        Ok(self)
    }

    pub(crate) fn register(
        &mut self,
        method: Option<HttpMethod>,
        path: &str,
        handler: Arc<dyn Handler>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> RouteResult<()> {
        let pattern = RoutePattern::parse(path, &self.constraints)?;
        self.insert(method, pattern, handler, middleware)
    }

    fn insert(
        &mut self,
        method: Option<HttpMethod>,
        pattern: RoutePattern,
        handler: Arc<dyn Handler>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> RouteResult<()> {
        let canonical = pattern.canonical();
        let info = RouteInfo {
            method,
            path: canonical.clone(),
            params: pattern.param_names.clone(),
            middleware: middleware.iter().map(|m| m.name().to_string()).collect(),
        };
        let endpoint = Endpoint {
            method,
            pattern: pattern.clone(),
            canonical,
            handler,
            middleware,
            pipeline: OnceCell::new(),
        };

        let trie = match method {
            Some(method) => self
                .tries
                .entry(method)
                .or_insert_with(|| RouteTrie::new(Some(method))),
            None => &mut self.any,
        };
        trie.insert(&pattern, endpoint)?;

        tracing::debug!(
            target: "elif::router",
            "Registered {} {}",
            method.map(|m| m.as_str()).unwrap_or("ANY"),
            info.path
        );
        self.routes.push(info);
        Ok(())
    }

    /// Find the route for a request
    ///
    /// Segments are percent-decoded before matching. Paths that fail to
    /// decode or exceed `max_path_segments` are reported as not found.
    pub fn lookup(&self, method: HttpMethod, path: &str) -> RouteLookup<'_> {
        let Some(segments) = self.decode_path(path) else {
            return RouteLookup::NotFound;
        };

        let mut found = self.find(method, &segments);
        if found.is_none() && method == HttpMethod::HEAD && self.config.head_fallback_to_get {
            found = self.find(HttpMethod::GET, &segments);
        }

        if let Some(route) = found {
            tracing::debug!(target: "elif::router", "Matched {} {} to {}", method, path, route.pattern());
            return RouteLookup::Match(route);
        }

        let allowed: Vec<HttpMethod> = HttpMethod::ALL
            .iter()
            .copied()
            .filter(|other| *other != method)
            .filter(|other| {
                self.tries
                    .get(other)
                    .and_then(|trie| trie.lookup(&segments, self.config.allow_path_traversal))
                    .is_some()
            })
            .collect();

        if allowed.is_empty() {
            tracing::debug!(target: "elif::router", "No route for {} {}", method, path);
            return RouteLookup::NotFound;
        }

        let allowed = if self.config.head_fallback_to_get {
            AllowedMethods::new(allowed)
        } else {
            AllowedMethods::exact(allowed)
        };
        tracing::debug!(target: "elif::router", "{} not allowed for {} (allow: {})", method, path, allowed.header_value());
        RouteLookup::MethodNotAllowed { allowed }
    }

    fn find<S: AsRef<str>>(&self, method: HttpMethod, segments: &[S]) -> Option<RouteMatch<'_>> {
        let allow_traversal = self.config.allow_path_traversal;
        self.tries
            .get(&method)
            .and_then(|trie| trie.lookup(segments, allow_traversal))
            .or_else(|| self.any.lookup(segments, allow_traversal))
            .map(|found| RouteMatch {
                endpoint: found.value,
                params: found.params,
            })
    }

    fn decode_path<'p>(&self, path: &'p str) -> Option<Vec<Cow<'p, str>>> {
        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            if segments.len() == self.config.max_path_segments {
                tracing::debug!(target: "elif::router", "Path exceeds {} segments", self.config.max_path_segments);
                return None;
            }
            match urlencoding::decode(raw) {
                Ok(segment) => segments.push(segment),
                Err(e) => {
                    tracing::debug!(target: "elif::router", "Undecodable path segment '{}': {}", raw, e);
                    return None;
                }
            }
        }
        Some(segments)
    }

    /// Registered routes in registration order
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn method_rank(endpoint: &Endpoint) -> u8 {
    endpoint.method.map(|m| m.order()).unwrap_or(u8::MAX)
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}
