use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::executor::block_on;

use wireframe_core::router::{
    BoxFuture, BoxHandler, FlatRouter, Pattern, RouteParams, RouteResult, RouteToken, Router,
    RouterError, MAX_NESTING_DEPTH,
};
use wireframe_core::types::HttpMethod;

fn handler(token: RouteToken) -> BoxHandler {
    Box::new(move |_params: &mut RouteParams| -> BoxFuture<'_, RouteResult> {
        Box::pin(async move { Ok(token) })
    })
}

fn recording_handler(counter: Arc<AtomicUsize>, token: RouteToken) -> BoxHandler {
    Box::new(move |_params: &mut RouteParams| -> BoxFuture<'_, RouteResult> {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(token)
        })
    })
}

fn params(method: HttpMethod, path: &str) -> RouteParams {
    RouteParams::new(method.clone(), method.as_str().to_string(), path.to_string(), String::new())
}

#[test]
fn wildcard_must_be_final_segment() {
    assert!(matches!(
        Pattern::compile("/*rest/more"),
        Err(RouterError::InvalidPattern(_))
    ));
}

/// `MAX_NESTING_DEPTH` caps router nesting depth at mount time, not path
/// segment count — a deep literal path compiles fine either way.
#[test]
fn router_nesting_depth_is_capped_at_mount_time() {
    let mut current = Router::new();
    current
        .route(Some(HttpMethod::GET), "/leaf", handler(RouteToken::Send))
        .unwrap();
    for _ in 0..MAX_NESTING_DEPTH - 1 {
        let mut outer = Router::new();
        outer.mount("/n", current).unwrap();
        current = outer;
    }
    // `current` nests MAX_NESTING_DEPTH - 1 deep; mounting it once more
    // reaches exactly the cap and succeeds.
    let mut at_cap = Router::new();
    assert!(at_cap.mount("/n", current).is_ok());

    let mut current = Router::new();
    current
        .route(Some(HttpMethod::GET), "/leaf", handler(RouteToken::Send))
        .unwrap();
    for _ in 0..MAX_NESTING_DEPTH {
        let mut outer = Router::new();
        outer.mount("/n", current).unwrap();
        current = outer;
    }
    let mut over_cap = Router::new();
    assert!(matches!(
        over_cap.mount("/n", current),
        Err(RouterError::NestingTooDeep { .. })
    ));
}

/// A `use`-style layer registered with a pattern only runs for requests
/// whose path falls under that pattern.
#[test]
fn use_layer_is_scoped_to_its_pattern() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();
    router
        .layer("/api", recording_handler(hits.clone(), RouteToken::Next))
        .unwrap();
    router
        .route(Some(HttpMethod::GET), "/api/users/:id", handler(RouteToken::Send))
        .unwrap();
    router
        .route(Some(HttpMethod::GET), "/other", handler(RouteToken::Complete))
        .unwrap();

    let mut p = params(HttpMethod::GET, "/api/users/42");
    assert_eq!(block_on(router.dispatch(&mut p)).unwrap(), RouteToken::Send);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let mut p = params(HttpMethod::GET, "/other");
    assert_eq!(block_on(router.dispatch(&mut p)).unwrap(), RouteToken::Complete);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "mw1 must not fire outside /api");
}

/// A nested router mounted under a prefix is reachable through both the
/// mutable `Router` and its flattened `FlatRouter`, with path-prefix
/// concatenation applied to its routes.
#[test]
fn nested_router_routes_are_reachable_under_its_mount_prefix() {
    let build = || {
        let mut api = Router::new();
        api.route(Some(HttpMethod::GET), "/users/:id", handler(RouteToken::Send))
            .unwrap();

        let mut root = Router::new();
        root.mount("/api", api).unwrap();
        root.route(Some(HttpMethod::GET), "/health", handler(RouteToken::Complete))
            .unwrap();
        root
    };

    let mutable = build();
    let mut p = params(HttpMethod::GET, "/api/users/7");
    let result = block_on(mutable.dispatch(&mut p)).unwrap();
    assert_eq!(result, RouteToken::Send);
    assert_eq!(p.param("id"), Some("7"));

    let flat = build().compile();
    let mut p = params(HttpMethod::GET, "/api/users/7");
    let result = block_on(flat.dispatch(&mut p)).unwrap();
    assert_eq!(result, RouteToken::Send);
    assert_eq!(p.param("id"), Some("7"));

    assert_eq!(flat.route_count(), mutable.route_count());
}

/// A `use` layer registered inside a nested router still runs, scoped to
/// its pattern concatenated with the mount prefix.
#[test]
fn nested_router_use_layer_runs_under_the_mount_prefix() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut api = Router::new();
    api.layer("/users", recording_handler(hits.clone(), RouteToken::Next))
        .unwrap();
    api.route(
        Some(HttpMethod::GET),
        "/users/:id",
        recording_handler(hits.clone(), RouteToken::Send),
    )
    .unwrap();

    let mut root = Router::new();
    root.mount("/api", api).unwrap();

    let mut p = params(HttpMethod::GET, "/api/users/7");
    let result = block_on(root.dispatch(&mut p)).unwrap();
    assert_eq!(result, RouteToken::Send);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn literal_beats_parameter_beats_wildcard() {
    let mut router = Router::new();
    router
        .route(Some(HttpMethod::GET), "/users/:id", handler(RouteToken::Send))
        .unwrap();
    router
        .route(Some(HttpMethod::GET), "/users/all", handler(RouteToken::Complete))
        .unwrap();
    router
        .route(Some(HttpMethod::GET), "/users/*rest", handler(RouteToken::Close))
        .unwrap();

    let mut p = params(HttpMethod::GET, "/users/all");
    let result = block_on(router.dispatch(&mut p)).unwrap();
    assert_eq!(result, RouteToken::Complete);

    let mut p = params(HttpMethod::GET, "/users/42");
    let result = block_on(router.dispatch(&mut p)).unwrap();
    assert_eq!(result, RouteToken::Send);
    assert_eq!(p.param("id"), Some("42"));
}

/// A `use`-style layer runs before the matched handler, and path
/// parameters are visible to it.
#[test]
fn middleware_layer_runs_before_matched_handler() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();
    router
        .layer("/", recording_handler(hits.clone(), RouteToken::Next))
        .unwrap();
    router
        .route(
            Some(HttpMethod::GET),
            "/api/users/:id",
            recording_handler(hits.clone(), RouteToken::Send),
        )
        .unwrap();

    let mut p = params(HttpMethod::GET, "/api/users/42");
    let result = block_on(router.dispatch(&mut p)).unwrap();
    assert_eq!(result, RouteToken::Send);
    assert_eq!(p.param("id"), Some("42"));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn next_route_falls_through_to_the_next_candidate() {
    let mut router = Router::new();
    router
        .route(Some(HttpMethod::GET), "/x/:id", handler(RouteToken::NextRoute))
        .unwrap();
    router
        .route(Some(HttpMethod::GET), "/x/*rest", handler(RouteToken::Send))
        .unwrap();

    let mut p = params(HttpMethod::GET, "/x/42");
    let result = block_on(router.dispatch(&mut p)).unwrap();
    assert_eq!(result, RouteToken::Send);
}

#[test]
fn exhausting_all_candidates_via_next_route_is_an_error() {
    let mut router = Router::new();
    router
        .route(Some(HttpMethod::GET), "/x/:id", handler(RouteToken::NextRoute))
        .unwrap();

    let mut p = params(HttpMethod::GET, "/x/42");
    let result = block_on(router.dispatch(&mut p));
    assert_eq!(result, Err(RouterError::ExhaustedRoutes));
}

#[test]
fn no_matching_route_is_an_error() {
    let router = Router::new();
    let mut p = params(HttpMethod::GET, "/nowhere");
    let result = block_on(router.dispatch(&mut p));
    assert_eq!(result, Err(RouterError::NoMatch));
}

#[test]
fn suspend_without_resume_never_rejoins_dispatch() {
    let mut router = Router::new();
    router
        .route(
            Some(HttpMethod::GET),
            "/slow",
            Box::new(|params: &mut RouteParams| -> BoxFuture<'_, RouteResult> {
                Box::pin(async move {
                    let suspender = params.suspend();
                    drop(suspender);
                    Ok(RouteToken::Suspend)
                })
            }),
        )
        .unwrap();

    let mut p = params(HttpMethod::GET, "/slow");
    let result = block_on(router.dispatch(&mut p));
    assert_eq!(result, Err(RouterError::HandlerDropped));
}

/// A handler that returns `Suspend` is re-invoked once its paired
/// [`Suspender`] fires; it must track its own progress across that
/// second invocation.
#[test]
fn suspend_then_resume_completes_the_chain() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_captured = calls.clone();
    let mut router = Router::new();
    router
        .route(
            Some(HttpMethod::GET),
            "/slow",
            Box::new(move |params: &mut RouteParams| -> BoxFuture<'_, RouteResult> {
                let calls = calls_captured.clone();
                Box::pin(async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        let suspender = params.suspend();
                        suspender.resume();
                        Ok(RouteToken::Suspend)
                    } else {
                        Ok(RouteToken::Send)
                    }
                })
            }),
        )
        .unwrap();

    let mut p = params(HttpMethod::GET, "/slow");
    let result = block_on(router.dispatch(&mut p));
    assert_eq!(result, Ok(RouteToken::Send));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// `FlatRouter::dispatch` must agree with `Router::dispatch` for every
/// request, since `compile()` only precomputes candidate ordering.
#[test]
fn flat_router_dispatch_matches_mutable_router_dispatch() {
    let build = || {
        let mut router = Router::new();
        router
            .route(Some(HttpMethod::GET), "/users/:id", handler(RouteToken::Send))
            .unwrap();
        router
            .route(Some(HttpMethod::GET), "/users/all", handler(RouteToken::Complete))
            .unwrap();
        router
            .route(Some(HttpMethod::POST), "/users", handler(RouteToken::Close))
            .unwrap();
        router
    };

    let mutable = build();
    let flat = build().compile();

    for (method, path) in [
        (HttpMethod::GET, "/users/all"),
        (HttpMethod::GET, "/users/7"),
        (HttpMethod::POST, "/users"),
        (HttpMethod::DELETE, "/users/7"),
    ] {
        let mut p1 = params(method.clone(), path);
        let mut p2 = params(method, path);
        let r1 = block_on(mutable.dispatch(&mut p1));
        let r2 = block_on(flat.dispatch(&mut p2));
        assert_eq!(r1, r2, "mismatch for {path}");
        if r1.is_ok() {
            assert_eq!(p1.params(), p2.params());
        }
    }

    assert_eq!(flat.route_count(), mutable.route_count());
}
