//! # Timing Middleware
//!
//! Request timing middleware for performance monitoring.

use crate::{
    config::{RouterConfig, RouterDefaults},
    middleware::{BoxFuture, HandlerResult, Middleware, Next},
    request::RequestContext,
};
use std::time::{Duration, Instant};

/// Request timing middleware that tracks request duration and adds timing headers
#[derive(Debug)]
pub struct TimingMiddleware {
    /// Whether to add X-Response-Time header to responses
    add_header: bool,
    /// Warning threshold in milliseconds for slow requests
    slow_request_threshold_ms: u64,
}

impl TimingMiddleware {
    pub fn new() -> Self {
        Self {
            add_header: true,
            slow_request_threshold_ms: RouterDefaults::SLOW_REQUEST_THRESHOLD_MS,
        }
    }

    /// Use the slow request threshold from the router configuration
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new().with_slow_threshold(config.slow_request_threshold_ms)
    }

    /// Disable adding timing header to responses
    pub fn without_header(mut self) -> Self {
        self.add_header = false;
        self
    }

    /// Set slow request warning threshold in milliseconds
    pub fn with_slow_threshold(mut self, threshold_ms: u64) -> Self {
        self.slow_request_threshold_ms = threshold_ms;
        self
    }
}

impl Default for TimingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

/// Request start time, stored in the context extensions
#[derive(Debug, Clone, Copy)]
pub struct RequestStartTime(Instant);

impl RequestStartTime {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

impl Middleware for TimingMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let start = RequestStartTime::now();
            ctx.extensions_mut().insert(start);

            let result = next.run(ctx).await;

            let duration = start.elapsed();
            let duration_ms = duration.as_millis() as u64;

            if self.add_header {
                if let Some(response) = ctx.response_mut() {
                    if let Err(e) = response.add_header("X-Response-Time", &format_duration(duration)) {
                        tracing::warn!(target: "elif::middleware", "Failed to add X-Response-Time header: {}", e);
                    }
                }
            }

            if duration_ms > self.slow_request_threshold_ms {
                tracing::warn!(
                    target: "elif::middleware",
                    "Slow request: {} {} took {}ms (threshold: {}ms)",
                    ctx.method(),
                    ctx.path(),
                    duration_ms,
                    self.slow_request_threshold_ms
                );
            } else {
                tracing::debug!(target: "elif::middleware", "Request completed in {}ms", duration_ms);
            }

            result
        })
    }

    fn name(&self) -> &'static str {
        "TimingMiddleware"
    }
}

/// Format a duration for the `X-Response-Time` header
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 1000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if total_ms >= 1 {
        format!("{}ms", total_ms)
    } else {
        format!("{}us", duration.as_micros())
    }
}
