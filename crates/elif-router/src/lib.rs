//! # elif-router
//!
//! In-process HTTP router and middleware engine for the elif.rs framework.
//!
//! This crate provides:
//! - Route patterns with parameters, wildcards and per-segment constraints
//! - A prefix trie with fixed priority and backtracking lookup
//! - A registry with one trie per method, route groups and mounting
//! - A continuation-based middleware pipeline with onion ordering
//! - A dispatcher tying lookup and pipeline together, plus an axum bridge

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routing;
pub mod server;

pub use config::{RouterConfig, RouterDefaults};
pub use dispatcher::{Completion, Dispatcher};
pub use errors::{
    ConfigError, ConflictError, ConflictKind, HttpError, HttpResult, MisuseError, RouteError,
    RouteResult,
};
pub use logging::{init_logging, LoggingConfig};
pub use request::{CancellationToken, Extensions, RequestContext};
pub use response::RouteResponse;
pub use server::into_axum_router;

// Re-export routing types
pub use routing::{
    AllowedMethods, Constraint, ConstraintTable, HttpMethod, ParamError, PathParams, RouteGroup,
    RouteInfo, RouteLookup, RouteMatch, RoutePattern, RouteRegistry,
};

// Re-export middleware types
pub use middleware::{
    core::{
        LoggingMiddleware, RecoveryConfig, RecoveryMiddleware, RequestId, RequestIdMiddleware,
        RequestIdStrategy, TimingMiddleware,
    },
    handler_fn, middleware_fn, BoxFuture, Handler, HandlerResult, Middleware, Next, Pipeline,
};
