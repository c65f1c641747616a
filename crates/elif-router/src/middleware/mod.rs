//! # Middleware
//!
//! Continuation-based middleware with the `handle(ctx, next)` pattern.
//!
//! A middleware receives the request context and a [`Next`] handle for the
//! rest of the chain. It can run code before and after `next.run(ctx)`,
//! skip `next` entirely and write a response itself, or return an error
//! that unwinds through every middleware already entered.
//!
//! `Next::run` takes `self` by value, so the rest of the chain cannot be
//! entered twice.

pub mod core;
pub mod pipeline;

pub use pipeline::Pipeline;

use crate::errors::{HttpError, HttpResult, MisuseError};
use crate::request::RequestContext;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed `Send` future returned by middleware and handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a handler or middleware; the response lives in the context
pub type HandlerResult = HttpResult<()>;

/// Terminal request handler
///
/// A handler writes its response with [`RequestContext::respond`] and never
/// sees a continuation.
pub trait Handler: Send + Sync {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult>;
}

/// Middleware trait with `handle(ctx, next)`
pub trait Middleware: Send + Sync {
    /// Handle the request and optionally call the rest of the chain
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>)
        -> BoxFuture<'a, HandlerResult>;

    /// Middleware name for debugging and route introspection
    fn name(&self) -> &'static str {
        "Middleware"
    }
}

/// The rest of the middleware chain, ending in the handler
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(middleware: &'a [Arc<dyn Middleware>], handler: &'a dyn Handler) -> Self {
        Self {
            middleware,
            handler,
        }
    }

    /// Run the rest of the chain
    ///
    /// Returns `Cancelled` when the context was cancelled before the next
    /// step is entered or by the time it returns, and a misuse error when a
    /// step reports success without leaving a response behind.
    pub fn run<'c>(self, ctx: &'c mut RequestContext) -> BoxFuture<'c, HandlerResult>
    where
        'a: 'c,
    {
        Box::pin(async move {
            if ctx.is_cancelled() {
                tracing::debug!(target: "elif::middleware", "Request cancelled, unwinding {} {}", ctx.method(), ctx.path());
                return Err(HttpError::Cancelled);
            }

            match self.middleware.split_first() {
                Some((current, rest)) => {
                    let result = current.handle(ctx, Next::new(rest, self.handler)).await;
                    if ctx.is_cancelled() {
                        tracing::debug!(target: "elif::middleware", "Request cancelled inside '{}'", current.name());
                        return Err(HttpError::Cancelled);
                    }
                    if result.is_ok() && !ctx.has_response() {
                        tracing::warn!(
                            target: "elif::middleware",
                            "Middleware '{}' finished without a response",
                            current.name()
                        );
                        return Err(MisuseError::DroppedContinuation(current.name()).into());
                    }
                    result
                }
                None => {
                    let result = self.handler.call(ctx).await;
                    if ctx.is_cancelled() {
                        tracing::debug!(target: "elif::middleware", "Request cancelled inside handler for {} {}", ctx.method(), ctx.path());
                        return Err(HttpError::Cancelled);
                    }
                    if result.is_ok() && !ctx.has_response() {
                        tracing::warn!(
                            target: "elif::middleware",
                            "Handler for {} {} finished without a response",
                            ctx.method(),
                            ctx.path()
                        );
                        return Err(MisuseError::NoResponse.into());
                    }
                    result
                }
            }
        })
    }

    /// Number of middleware left before the handler
    pub fn remaining(&self) -> usize {
        self.middleware.len()
    }
}

/// Handler built from a closure, see [`handler_fn`]
pub struct FnHandler<F> {
    func: F,
}

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        (self.func)(ctx)
    }
}

/// Adapt a closure into a [`Handler`]
///
/// ```ignore
/// let hello = handler_fn(|ctx| Box::pin(async move {
///     ctx.respond(RouteResponse::ok().text("hello"));
///     Ok(())
/// }));
/// ```
pub fn handler_fn<F>(func: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    FnHandler { func }
}

/// Middleware built from a closure, see [`middleware_fn`]
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        (self.func)(ctx, next)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Adapt a closure into a named [`Middleware`]
pub fn middleware_fn<F>(name: &'static str, func: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    FnMiddleware { name, func }
}
