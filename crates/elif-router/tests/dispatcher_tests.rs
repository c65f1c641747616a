use axum::http::StatusCode;
use elif_router::{
    handler_fn, middleware_fn, Completion, Constraint, Dispatcher, Handler, HttpError, HttpMethod,
    RecoveryMiddleware, RequestContext, RequestId, RequestIdMiddleware, RouteRegistry,
    RouteResponse, RouterConfig, TimingMiddleware,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn echo_param(name: &'static str) -> impl Handler {
    handler_fn(move |ctx| {
        Box::pin(async move {
            let value = ctx.param(name).unwrap_or_default().to_string();
            ctx.respond(RouteResponse::ok().text(value));
            Ok(())
        })
    })
}

fn sleeper(duration: Duration) -> impl Handler {
    handler_fn(move |ctx| {
        Box::pin(async move {
            tokio::time::sleep(duration).await;
            ctx.respond(RouteResponse::ok());
            Ok(())
        })
    })
}

async fn body_of(dispatcher: &Dispatcher, method: HttpMethod, path: &str) -> (StatusCode, String) {
    let mut ctx = RequestContext::new(method, path);
    let response = dispatcher.dispatch(&mut ctx).await.into_response(&mut ctx);
    (
        response.status(),
        String::from_utf8_lossy(response.body()).into_owned(),
    )
}

/// Full request flow: params are bound before the handler runs
#[tokio::test]
async fn test_dispatch_binds_decoded_params() {
    let mut registry = RouteRegistry::new();
    registry.get("/greet/:name", echo_param("name")).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let (status, body) = body_of(&dispatcher, HttpMethod::GET, "/greet/J%C3%BCrgen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Jürgen");
}

#[tokio::test(start_paused = true)]
async fn test_deadline_cancels_slow_pipeline() {
    let mut registry = RouteRegistry::new();
    registry.get("/slow", sleeper(Duration::from_secs(60))).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::GET, "/slow");
    let completion = dispatcher
        .handle_with_deadline(&mut ctx, Duration::from_secs(1))
        .await;

    assert!(matches!(completion.error(), Some(HttpError::RequestTimeout)));
    assert!(ctx.is_cancelled());
    assert!(!ctx.has_response());
    assert_eq!(
        completion.into_response(&mut ctx).status(),
        StatusCode::REQUEST_TIMEOUT
    );
}

#[tokio::test(start_paused = true)]
async fn test_deadline_not_reached() {
    let mut registry = RouteRegistry::new();
    registry.get("/quick", sleeper(Duration::from_millis(10))).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::GET, "/quick");
    let completion = dispatcher
        .handle_with_deadline(&mut ctx, Duration::from_secs(1))
        .await;

    assert!(matches!(completion, Completion::Ok(StatusCode::OK)));
    assert!(!ctx.is_cancelled());
}

#[tokio::test]
async fn test_cancelled_request_does_not_reach_handler() {
    let mut registry = RouteRegistry::new();
    registry.get("/", echo_param("none")).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::GET, "/");
    ctx.cancellation_token().cancel();

    let completion = dispatcher.dispatch(&mut ctx).await;
    assert!(matches!(completion.error(), Some(HttpError::Cancelled)));
    assert!(!ctx.has_response());
}

/// A handler that cancels mid-flight unwinds as `Cancelled` through the
/// outer middleware
#[tokio::test]
async fn test_cancellation_during_handler_unwinds() {
    let outer_saw: Arc<Mutex<Option<bool>>> = Arc::new(Mutex::new(None));

    let mut registry = RouteRegistry::new();
    registry.use_middleware({
        let outer_saw = outer_saw.clone();
        middleware_fn("outer", move |ctx, next| {
            let outer_saw = outer_saw.clone();
            Box::pin(async move {
                let result = next.run(ctx).await;
                *outer_saw.lock().unwrap() = Some(matches!(result, Err(HttpError::Cancelled)));
                result
            })
        })
    });
    registry
        .get(
            "/abandon",
            handler_fn(|ctx| {
                Box::pin(async move {
                    ctx.cancellation_token().cancel();
                    ctx.respond(RouteResponse::ok());
                    Ok(())
                })
            }),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::GET, "/abandon");
    let completion = dispatcher.dispatch(&mut ctx).await;

    assert!(matches!(completion, Completion::Failure(HttpError::Cancelled)));
    assert_eq!(*outer_saw.lock().unwrap(), Some(true));
}

#[tokio::test]
async fn test_recovery_renders_failures() {
    let mut registry = RouteRegistry::new();
    registry.use_middleware(RecoveryMiddleware::new());
    registry
        .get(
            "/forbidden",
            handler_fn(|_ctx| {
                Box::pin(async move { Err(HttpError::forbidden("staff only")) })
            }),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::GET, "/forbidden");
    let completion = dispatcher.dispatch(&mut ctx).await;
    assert!(matches!(completion, Completion::Ok(StatusCode::FORBIDDEN)));

    let response = completion.into_response(&mut ctx);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"]["code"], "ACCESS_FORBIDDEN");
}

#[tokio::test]
async fn test_head_falls_back_to_get() {
    let mut registry = RouteRegistry::new();
    registry.get("/posts/:id", echo_param("id")).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::HEAD, "/posts/7");
    assert!(dispatcher.dispatch(&mut ctx).await.is_ok());

    let config = RouterConfig {
        head_fallback_to_get: false,
        ..RouterConfig::default()
    };
    let mut strict = RouteRegistry::with_config(config);
    strict.get("/posts/:id", echo_param("id")).unwrap();
    let dispatcher = Dispatcher::new(strict);

    let mut ctx = RequestContext::new(HttpMethod::HEAD, "/posts/7");
    match dispatcher.dispatch(&mut ctx).await {
        Completion::MethodNotAllowed(allowed) => assert_eq!(allowed.header_value(), "GET"),
        other => panic!("expected MethodNotAllowed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mounted_registry_keeps_its_middleware() {
    let mut blog = RouteRegistry::new();
    blog.use_middleware(middleware_fn("blog-banner", |ctx, next| {
        Box::pin(async move {
            let result = next.run(ctx).await;
            if let Some(response) = ctx.response_mut() {
                response.add_header("X-Section", "blog")?;
            }
            result
        })
    }));
    blog.get("/posts/:slug<slug>", echo_param("slug")).unwrap();

    let mut registry = RouteRegistry::new();
    registry.get("/", echo_param("none")).unwrap();
    registry.mount("/blog", blog).unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::GET, "/blog/posts/hello-world");
    let response = dispatcher.dispatch(&mut ctx).await.into_response(&mut ctx);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.header("X-Section"), Some("blog"));
    assert_eq!(response.body().as_ref(), b"hello-world");

    let mut ctx = RequestContext::new(HttpMethod::GET, "/");
    let response = dispatcher.dispatch(&mut ctx).await.into_response(&mut ctx);
    assert_eq!(response.header("X-Section"), None);
}

#[tokio::test]
async fn test_custom_constraint_routes() {
    let mut registry = RouteRegistry::new();
    registry.define_constraint(
        "even",
        Constraint::predicate("even", |v| v.parse::<u64>().map(|n| n % 2 == 0).unwrap_or(false)),
    );
    registry.get("/numbers/:n<even>", echo_param("n")).unwrap();
    let dispatcher = Dispatcher::new(registry);

    assert_eq!(body_of(&dispatcher, HttpMethod::GET, "/numbers/4").await.0, StatusCode::OK);
    assert_eq!(
        body_of(&dispatcher, HttpMethod::GET, "/numbers/5").await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_bundled_middleware_stack() {
    let mut registry = RouteRegistry::new();
    registry
        .use_middleware(RequestIdMiddleware::new())
        .use_middleware(TimingMiddleware::new())
        .use_middleware(RecoveryMiddleware::new());
    registry
        .get(
            "/whoami",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let id = ctx
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.as_str().to_string())
                        .unwrap_or_default();
                    ctx.respond(RouteResponse::ok().text(id));
                    Ok(())
                })
            }),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(registry);

    let mut ctx = RequestContext::new(HttpMethod::GET, "/whoami").with_header("x-request-id", "abc-123");
    let response = dispatcher.dispatch(&mut ctx).await.into_response(&mut ctx);

    assert_eq!(response.body().as_ref(), b"abc-123");
    assert_eq!(response.header("x-request-id"), Some("abc-123"));
    assert!(response.header("X-Response-Time").is_some());
}
