//! Composed middleware pipeline
//!
//! A pipeline is built once at registration time and shared by every
//! request that hits its route. Per-request state lives in the [`Next`]
//! cursor and the context, never in the pipeline.

use super::{Handler, HandlerResult, Middleware, Next};
use crate::request::RequestContext;
use std::fmt;
use std::sync::Arc;

/// Ordered middleware around one terminal handler
#[derive(Clone)]
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
}

impl Pipeline {
    /// Compose `middleware` (outer to inner) around `handler`
    pub fn compose(middleware: Vec<Arc<dyn Middleware>>, handler: Arc<dyn Handler>) -> Self {
        Self {
            middleware,
            handler,
        }
    }

    /// Pipeline with no middleware
    pub fn handler_only(handler: Arc<dyn Handler>) -> Self {
        Self::compose(Vec::new(), handler)
    }

    /// Execute the pipeline against one request
    ///
    /// Middleware "before" phases run in order, "after" phases in reverse.
    pub async fn execute(&self, ctx: &mut RequestContext) -> HandlerResult {
        Next::new(&self.middleware, self.handler.as_ref())
            .run(ctx)
            .await
    }

    /// Get number of middleware in pipeline
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Get middleware names for debugging
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware", &self.names())
            .finish()
    }
}
