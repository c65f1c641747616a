//! Axum bridge
//!
//! Serves a [`Dispatcher`] behind an `axum::Router`. Every request goes to
//! one fallback handler that builds a [`RequestContext`], dispatches it and
//! converts the completion back. Binding a listener is left to the
//! application (`axum::serve`).

use crate::config::RouterConfig;
use crate::dispatcher::Dispatcher;
use crate::errors::HttpError;
use crate::request::RequestContext;
use crate::routing::HttpMethod;
use axum::extract::{Request, State};
use axum::response::Response;
use std::sync::Arc;

struct BridgeState {
    dispatcher: Dispatcher,
    config: RouterConfig,
}

/// Wrap a dispatcher into an axum router
pub fn into_axum_router(dispatcher: Dispatcher, config: RouterConfig) -> axum::Router {
    let state = Arc::new(BridgeState { dispatcher, config });
    axum::Router::new().fallback(bridge).with_state(state)
}

async fn bridge(State(state): State<Arc<BridgeState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let method = match HttpMethod::try_from(&parts.method) {
        Ok(method) => method,
        Err(_) => {
            tracing::debug!(target: "elif::router", "Rejecting unsupported method {}", parts.method);
            return HttpError::NotImplemented {
                method: parts.method.to_string(),
            }
            .to_response()
            .into_axum_response();
        }
    };

    let limit = state.config.max_body_bytes;
    let body = match axum::body::to_bytes(body, limit).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(target: "elif::router", "Rejecting request body: {}", e);
            return HttpError::PayloadTooLarge { limit }
                .to_response()
                .into_axum_response();
        }
    };

    let mut ctx = RequestContext::new(method, parts.uri.path())
        .with_headers(parts.headers)
        .with_body(body);

    let completion = match state.config.request_timeout() {
        Some(deadline) => state.dispatcher.handle_with_deadline(&mut ctx, deadline).await,
        None => state.dispatcher.dispatch(&mut ctx).await,
    };

    completion.into_response(&mut ctx).into_axum_response()
}
