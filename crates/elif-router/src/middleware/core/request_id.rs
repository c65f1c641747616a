//! # Request ID Middleware
//!
//! Reuses an incoming request ID header or generates one, makes it
//! available to handlers through the context extensions and echoes it on
//! the response.

use crate::{
    middleware::{BoxFuture, HandlerResult, Middleware, Next},
    request::RequestContext,
};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Request ID generation strategy
#[derive(Debug, Default)]
pub enum RequestIdStrategy {
    /// Random UUID v4
    #[default]
    UuidV4,
    /// Incrementing counter (not suitable for distributed systems)
    Counter(AtomicU64),
    /// Custom prefix followed by a UUID v4
    PrefixedUuid(String),
    /// Custom function
    Custom(fn() -> String),
}

impl RequestIdStrategy {
    /// Generate a new request ID using this strategy
    pub fn generate(&self) -> String {
        match self {
            Self::UuidV4 => Uuid::new_v4().to_string(),
            Self::Counter(counter) => {
                let count = counter.fetch_add(1, Ordering::Relaxed);
                format!("req-{:016x}", count)
            }
            Self::PrefixedUuid(prefix) => format!("{}-{}", prefix, Uuid::new_v4()),
            Self::Custom(generator) => generator(),
        }
    }
}

/// The current request's ID, stored in the context extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Middleware for request ID generation and tracking
#[derive(Debug)]
pub struct RequestIdMiddleware {
    header_name: String,
    strategy: RequestIdStrategy,
    override_existing: bool,
    add_to_response: bool,
}

impl RequestIdMiddleware {
    pub fn new() -> Self {
        Self {
            header_name: "x-request-id".to_string(),
            strategy: RequestIdStrategy::default(),
            override_existing: false,
            add_to_response: true,
        }
    }

    /// Set custom header name for request ID
    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set request ID generation strategy
    pub fn strategy(mut self, strategy: RequestIdStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use counter strategy
    pub fn counter(self) -> Self {
        self.strategy(RequestIdStrategy::Counter(AtomicU64::new(0)))
    }

    /// Generate a new ID even if the request carries one
    pub fn override_existing(mut self) -> Self {
        self.override_existing = true;
        self
    }

    /// Don't add request ID to response headers
    pub fn no_response_header(mut self) -> Self {
        self.add_to_response = false;
        self
    }

    fn get_or_generate(&self, ctx: &RequestContext) -> String {
        if !self.override_existing {
            if let Some(existing) = ctx.header(&self.header_name) {
                if !existing.trim().is_empty() {
                    return existing.to_string();
                }
            }
        }

        self.strategy.generate()
    }
}

impl Default for RequestIdMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for RequestIdMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let request_id = self.get_or_generate(ctx);
            tracing::debug!(target: "elif::middleware", request_id = %request_id, "Request started");
            ctx.extensions_mut().insert(RequestId(request_id.clone()));

            let result = next.run(ctx).await;

            if self.add_to_response {
                if let Some(response) = ctx.response_mut() {
                    if let Err(e) = response.add_header(&self.header_name, &request_id) {
                        tracing::warn!(target: "elif::middleware", "Failed to add {} header: {}", self.header_name, e);
                    }
                }
            }

            result
        })
    }

    fn name(&self) -> &'static str {
        "RequestIdMiddleware"
    }
}
