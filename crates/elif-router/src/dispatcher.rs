//! Request dispatcher
//!
//! Looks up the route, binds its parameters into the context and runs the
//! route's pipeline. The pipeline for a route is composed on first use and
//! reused for every later request.

use crate::errors::{HttpError, MisuseError};
use crate::request::RequestContext;
use crate::response::RouteResponse;
use crate::routing::{AllowedMethods, HttpMethod, RouteLookup, RouteRegistry};
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// How a dispatched request ended
#[derive(Debug)]
pub enum Completion {
    /// The pipeline wrote a response with this status
    Ok(StatusCode),
    /// No route matched the path
    NotFound,
    /// The path matched under other methods only
    MethodNotAllowed(AllowedMethods),
    /// A middleware or handler failed and nothing recovered it
    Failure(HttpError),
}

impl Completion {
    pub fn is_ok(&self) -> bool {
        matches!(self, Completion::Ok(_))
    }

    /// The failure, if the pipeline raised one
    pub fn error(&self) -> Option<&HttpError> {
        match self {
            Completion::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Render this completion as the response to send
    ///
    /// `Ok` yields the response written into the context; everything else
    /// becomes a JSON error response.
    pub fn into_response(self, ctx: &mut RequestContext) -> RouteResponse {
        match self {
            Completion::Ok(_) => ctx
                .take_response()
                .unwrap_or_else(|| HttpError::from(MisuseError::NoResponse).to_response()),
            Completion::NotFound => HttpError::not_found(ctx.path()).to_response(),
            Completion::MethodNotAllowed(allowed) => {
                HttpError::method_not_allowed(ctx.method().as_str(), allowed.header_value()).to_response()
            }
            Completion::Failure(error) => error.to_response(),
        }
    }
}

/// Dispatches requests against a finalized registry
///
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
}

impl Dispatcher {
    /// Finalize `registry` for dispatching
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Dispatch using the method and path carried by the context
    pub async fn dispatch(&self, ctx: &mut RequestContext) -> Completion {
        let method = *ctx.method();
        let path = ctx.path().to_string();
        self.handle(method, &path, ctx).await
    }

    /// Route `method` and `path` and run the matched pipeline
    pub async fn handle(&self, method: HttpMethod, path: &str, ctx: &mut RequestContext) -> Completion {
        let route = match self.registry.lookup(method, path) {
            RouteLookup::Match(route) => route,
            RouteLookup::NotFound => return Completion::NotFound,
            RouteLookup::MethodNotAllowed { allowed } => return Completion::MethodNotAllowed(allowed),
        };

        let endpoint = route.endpoint;
        ctx.bind_params(route.into_params());
        let pipeline = endpoint.pipeline(self.registry.global_middleware());

        match pipeline.execute(ctx).await {
            Ok(()) => match ctx.response() {
                Some(response) => Completion::Ok(response.status()),
                None => Completion::Failure(MisuseError::NoResponse.into()),
            },
            Err(error) => {
                if error.is_misuse() {
                    tracing::warn!(target: "elif::router", "Pipeline misuse on {} {}: {}", method, path, error);
                } else if error.status_code().is_server_error() {
                    tracing::error!(target: "elif::router", "Unhandled failure on {} {}: {}", method, path, error);
                } else {
                    tracing::debug!(target: "elif::router", "Request failed on {} {}: {}", method, path, error);
                }
                Completion::Failure(error)
            }
        }
    }

    /// Dispatch with a deadline
    ///
    /// When the deadline passes the pipeline is no longer awaited, the
    /// context is marked cancelled and the request fails with
    /// `RequestTimeout`.
    pub async fn handle_with_deadline(&self, ctx: &mut RequestContext, deadline: Duration) -> Completion {
        let token = ctx.cancellation_token();

        match tokio::time::timeout(deadline, self.dispatch(ctx)).await {
            Ok(completion) => completion,
            Err(_) => {
                token.cancel();
                tracing::warn!(
                    target: "elif::router",
                    "Request {} {} exceeded deadline of {:?}",
                    ctx.method(),
                    ctx.path(),
                    deadline
                );
                Completion::Failure(HttpError::RequestTimeout)
            }
        }
    }
}

impl From<RouteRegistry> for Dispatcher {
    fn from(registry: RouteRegistry) -> Self {
        Self::new(registry)
    }
}
