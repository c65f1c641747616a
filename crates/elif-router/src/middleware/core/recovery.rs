//! Recovery middleware
//!
//! The one place where a failure may be swallowed: errors raised further in
//! are logged and rendered into an error response.

use crate::{
    errors::HttpError,
    middleware::{BoxFuture, HandlerResult, Middleware, Next},
    request::RequestContext,
    response::RouteResponse,
};

/// Recovery middleware configuration
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Whether to log recovered errors
    pub log_errors: bool,

    /// Let `Cancelled` unwind to the caller instead of rendering it
    pub propagate_cancellation: bool,

    /// Custom renderer used instead of [`HttpError::to_response`]
    pub custom_renderer: Option<fn(&HttpError) -> RouteResponse>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            log_errors: true,
            propagate_cancellation: true,
            custom_renderer: None,
        }
    }
}

/// Converts failures from the rest of the chain into error responses
#[derive(Debug, Default)]
pub struct RecoveryMiddleware {
    config: RecoveryConfig,
}

impl RecoveryMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RecoveryConfig) -> Self {
        Self { config }
    }

    pub fn with_logging(mut self, enable: bool) -> Self {
        self.config.log_errors = enable;
        self
    }

    /// Set custom error renderer
    pub fn with_renderer(mut self, renderer: fn(&HttpError) -> RouteResponse) -> Self {
        self.config.custom_renderer = Some(renderer);
        self
    }

    fn log(&self, ctx: &RequestContext, error: &HttpError) {
        if !self.config.log_errors {
            return;
        }

        if error.is_misuse() {
            tracing::warn!(target: "elif::middleware", "Recovered pipeline misuse on {} {}: {}", ctx.method(), ctx.path(), error);
        } else if error.status_code().is_server_error() {
            tracing::error!(target: "elif::middleware", "Recovered error on {} {}: {}", ctx.method(), ctx.path(), error);
        } else {
            tracing::debug!(target: "elif::middleware", "Recovered error on {} {}: {}", ctx.method(), ctx.path(), error);
        }
    }
}

impl Middleware for RecoveryMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let error = match next.run(ctx).await {
                Ok(()) => return Ok(()),
                Err(HttpError::Cancelled) if self.config.propagate_cancellation => {
                    return Err(HttpError::Cancelled)
                }
                Err(error) => error,
            };

            self.log(ctx, &error);
            let response = match self.config.custom_renderer {
                Some(render) => render(&error),
                None => error.to_response(),
            };
            ctx.respond(response);
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "RecoveryMiddleware"
    }
}
