//! # Logging Middleware
//!
//! Request/response logging with a `tracing` span per request.

use crate::{
    middleware::{BoxFuture, HandlerResult, Middleware, Next},
    request::RequestContext,
};
use std::time::Instant;
use tracing::Instrument;

const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "x-api-key", "proxy-authorization"];

/// Request logging middleware that logs request details and response status
#[derive(Debug, Default)]
pub struct LoggingMiddleware {
    /// Whether to log request headers (sensitive ones are masked)
    log_request_headers: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable request header logging
    pub fn with_request_headers(mut self) -> Self {
        self.log_request_headers = true;
        self
    }
}

impl Middleware for LoggingMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        let span = tracing::info_span!(
            target: "elif::middleware",
            "http_request",
            method = %ctx.method(),
            path = %ctx.path()
        );

        Box::pin(
            async move {
                let start = Instant::now();
                tracing::info!(target: "elif::middleware", "-> {} {}", ctx.method(), ctx.path());

                if self.log_request_headers {
                    for (name, value) in ctx.headers() {
                        let value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                            "[REDACTED]"
                        } else {
                            value.to_str().unwrap_or("<binary>")
                        };
                        tracing::debug!(target: "elif::middleware", "  {}: {}", name, value);
                    }
                }

                let result = next.run(ctx).await;
                let elapsed_ms = start.elapsed().as_millis();

                match &result {
                    Ok(()) => {
                        let status = ctx.response().map(|r| r.status().as_u16()).unwrap_or(0);
                        tracing::info!(target: "elif::middleware", "<- {} in {}ms", status, elapsed_ms);
                    }
                    Err(error) if error.status_code().is_server_error() => {
                        tracing::error!(target: "elif::middleware", "<- failed in {}ms: {}", elapsed_ms, error);
                    }
                    Err(error) => {
                        tracing::info!(target: "elif::middleware", "<- {} in {}ms: {}", error.status_code().as_u16(), elapsed_ms, error);
                    }
                }

                result
            }
            .instrument(span),
        )
    }

    fn name(&self) -> &'static str {
        "LoggingMiddleware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HttpError;
    use crate::middleware::{handler_fn, Pipeline};
    use crate::response::RouteResponse;
    use crate::routing::HttpMethod;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_logging_is_transparent() {
        let pipeline = Pipeline::compose(
            vec![Arc::new(LoggingMiddleware::new().with_request_headers())],
            Arc::new(handler_fn(|ctx| {
                Box::pin(async move {
                    ctx.respond(RouteResponse::created());
                    Ok(())
                })
            })),
        );

        let mut ctx = RequestContext::new(HttpMethod::POST, "/items").with_header("authorization", "Bearer secret");
        pipeline.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().unwrap().status(), axum::http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_logging_does_not_swallow_errors() {
        let pipeline = Pipeline::compose(
            vec![Arc::new(LoggingMiddleware::new())],
            Arc::new(handler_fn(|_ctx| {
                Box::pin(async move { Err(HttpError::unauthorized()) })
            })),
        );

        let mut ctx = RequestContext::new(HttpMethod::GET, "/");
        let err = pipeline.execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, HttpError::Unauthorized));
    }
}
