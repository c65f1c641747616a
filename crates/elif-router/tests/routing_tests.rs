use elif_router::{
    handler_fn, Handler, HttpMethod, RouteLookup, RouteRegistry, RouteResponse, RouterConfig,
};

/// Handler that answers with a fixed label, so tests can tell routes apart
fn labelled(label: &'static str) -> impl Handler {
    handler_fn(move |ctx| {
        Box::pin(async move {
            ctx.respond(RouteResponse::ok().text(label));
            Ok(())
        })
    })
}

fn resolve(registry: &RouteRegistry, method: HttpMethod, path: &str) -> Option<(String, Vec<(String, String)>)> {
    match registry.lookup(method, path) {
        RouteLookup::Match(m) => Some((
            m.pattern().to_string(),
            m.params()
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        )),
        _ => None,
    }
}

const ROUTES: &[(&str, &str)] = &[
    ("a", "/"),
    ("b", "/users"),
    ("c", "/users/me"),
    ("d", "/users/:id"),
    ("e", "/users/:id<int>"),
    ("f", "/users/:id/posts"),
    ("g", r"/users/:id(\d+)/posts/:post"),
    ("h", "/files/*path"),
    ("i", "/files/readme"),
    ("j", "/api/v1/status"),
];

const PATHS: &[&str] = &[
    "/",
    "/users",
    "/users/me",
    "/users/42",
    "/users/alice",
    "/users/me/posts",
    "/users/42/posts/7",
    "/users/alice/posts/7",
    "/files/readme",
    "/files/docs/guide.md",
    "/files/../etc/passwd",
    "/api/v1/status",
    "/api/v2/status",
];

fn build(order: &[usize]) -> RouteRegistry {
    let mut registry = RouteRegistry::new();
    for &index in order {
        let (label, path) = ROUTES[index];
        registry.get(path, labelled(label)).unwrap();
    }
    registry
}

#[test]
fn test_static_routes_match_exactly_with_no_params() {
    let registry = build(&(0..ROUTES.len()).collect::<Vec<_>>());

    for path in ["/", "/users", "/users/me", "/files/readme", "/api/v1/status"] {
        let (pattern, params) = resolve(&registry, HttpMethod::GET, path).unwrap();
        assert_eq!(pattern, path);
        assert!(params.is_empty(), "{} captured {:?}", path, params);
    }
}

#[test]
fn test_param_binding_and_constraint_rejection() {
    let mut registry = RouteRegistry::new();
    registry.get("/posts/:id", labelled("post")).unwrap();
    let (_, params) = resolve(&registry, HttpMethod::GET, "/posts/42").unwrap();
    assert_eq!(params, vec![("id".to_string(), "42".to_string())]);

    let mut constrained = RouteRegistry::new();
    constrained.get(r"/posts/:id(\d+)", labelled("post")).unwrap();
    assert!(matches!(
        constrained.lookup(HttpMethod::GET, "/posts/abc"),
        RouteLookup::NotFound
    ));
}

#[test]
fn test_static_beats_param() {
    let registry = build(&[3, 2]);
    let (pattern, params) = resolve(&registry, HttpMethod::GET, "/users/me").unwrap();
    assert_eq!(pattern, "/users/me");
    assert!(params.is_empty());
}

#[test]
fn test_constrained_beats_unconstrained() {
    let registry = build(&[3, 4]);
    assert_eq!(resolve(&registry, HttpMethod::GET, "/users/42").unwrap().0, "/users/:id<int>");
    assert_eq!(resolve(&registry, HttpMethod::GET, "/users/alice").unwrap().0, "/users/:id");
}

#[test]
fn test_backtracking_after_deep_constraint_failure() {
    let registry = build(&[5, 6]);

    let (pattern, params) = resolve(&registry, HttpMethod::GET, "/users/42/posts/7").unwrap();
    assert_eq!(pattern, r"/users/:id(\d+)/posts/:post");
    assert_eq!(params.len(), 2);

    // `:id(\d+)` rejects "alice"; the plain `:id` branch has no `posts/:post`
    assert!(resolve(&registry, HttpMethod::GET, "/users/alice/posts/7").is_none());
    assert_eq!(
        resolve(&registry, HttpMethod::GET, "/users/alice/posts").unwrap().0,
        "/users/:id/posts"
    );
}

#[test]
fn test_wildcard_is_greedy_and_last() {
    let registry = build(&[7, 8]);

    let (pattern, params) = resolve(&registry, HttpMethod::GET, "/files/a/b/c.txt").unwrap();
    assert_eq!(pattern, "/files/*path");
    assert_eq!(params, vec![("path".to_string(), "a/b/c.txt".to_string())]);
    assert_eq!(resolve(&registry, HttpMethod::GET, "/files/readme").unwrap().0, "/files/readme");
}

#[test]
fn test_directory_traversal_is_rejected() {
    let registry = build(&[7]);
    assert!(matches!(
        registry.lookup(HttpMethod::GET, "/files/../secret"),
        RouteLookup::NotFound
    ));
    assert!(matches!(
        registry.lookup(HttpMethod::GET, "/files/a/%2E%2E/secret"),
        RouteLookup::NotFound
    ));

    let config = RouterConfig {
        allow_path_traversal: true,
        ..RouterConfig::default()
    };
    let mut permissive = RouteRegistry::with_config(config);
    permissive.get("/files/*path", labelled("files")).unwrap();
    let (_, params) = resolve(&permissive, HttpMethod::GET, "/files/../secret").unwrap();
    assert_eq!(params[0].1, "../secret");
}

#[test]
fn test_method_mismatch_is_not_not_found() {
    let mut registry = RouteRegistry::new();
    registry.post("/widgets/:id", labelled("create")).unwrap();

    match registry.lookup(HttpMethod::GET, "/widgets/9") {
        RouteLookup::MethodNotAllowed { allowed } => {
            assert!(allowed.contains(HttpMethod::POST));
            assert_eq!(allowed.header_value(), "POST");
        }
        other => panic!("expected MethodNotAllowed, got {:?}", other),
    }
}

#[test]
fn test_registration_order_does_not_change_results() {
    let forward: Vec<usize> = (0..ROUTES.len()).collect();
    let reverse: Vec<usize> = forward.iter().rev().copied().collect();
    let shuffled = vec![6, 1, 9, 3, 7, 0, 4, 8, 2, 5];

    let registries = [build(&forward), build(&reverse), build(&shuffled)];

    for path in PATHS {
        let expected = resolve(&registries[0], HttpMethod::GET, path);
        for registry in &registries[1..] {
            assert_eq!(resolve(registry, HttpMethod::GET, path), expected, "path {}", path);
        }
    }
}

#[test]
fn test_trailing_and_double_slashes_are_ignored() {
    let registry = build(&[1, 9]);
    assert!(resolve(&registry, HttpMethod::GET, "/users/").is_some());
    assert!(resolve(&registry, HttpMethod::GET, "//api//v1/status").is_some());
}

#[test]
fn test_routes_introspection() {
    let mut registry = RouteRegistry::new();
    registry.get("/users/:id<int>", labelled("show")).unwrap();
    registry.all("/health", labelled("health")).unwrap();

    let routes = registry.routes();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].method, Some(HttpMethod::GET));
    assert_eq!(routes[0].path, "/users/:id<int>");
    assert_eq!(routes[0].params, vec!["id"]);
    assert_eq!(routes[1].method, None);
}

#[test]
fn test_encoded_static_route_matches_either_spelling() {
    let mut registry = RouteRegistry::new();
    registry.get("/a%20b", labelled("spaced")).unwrap();

    assert_eq!(resolve(&registry, HttpMethod::GET, "/a%20b").unwrap().0, "/a b");
    assert!(resolve(&registry, HttpMethod::GET, "/a b").is_some());
    assert!(resolve(&registry, HttpMethod::GET, "/a%2520b").is_none());
}

#[test]
fn test_multi_segment_constraint_needs_a_wildcard() {
    let mut registry = RouteRegistry::new();
    assert!(registry.get(r"/dates/:range(\d+/\d+)", labelled("param")).is_err());

    registry.get(r"/dates/*range(\d+/\d+)", labelled("range")).unwrap();
    let (_, params) = resolve(&registry, HttpMethod::GET, "/dates/12/34").unwrap();
    assert_eq!(params, vec![("range".to_string(), "12/34".to_string())]);
    assert!(resolve(&registry, HttpMethod::GET, "/dates/12/ab").is_none());
}
