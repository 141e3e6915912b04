use std::future::Future;
use std::pin::Pin;

use crate::router::control::RouteToken;
use crate::router::error::RouterError;
use crate::router::params::RouteParams;
use crate::router::pattern::Pattern;
use crate::types::HttpMethod;

/// A boxed, `'static`, `Send`-able future, the coroutine representation a
/// route handler or middleware layer returns.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of running a single handler or layer.
pub type RouteResult = Result<RouteToken, RouterError>;

/// A type-erased request handler or middleware layer. Takes the in-flight
/// request state by mutable reference and returns a future resolving to
/// the [`RouteToken`] that tells the dispatch loop what to do next.
pub type BoxHandler = Box<dyn for<'a> Fn(&'a mut RouteParams) -> BoxFuture<'a, RouteResult> + Send + Sync>;

/// Maximum nesting depth for routers mounted via [`Router::mount`].
/// Exceeding this limit is a configuration error raised at mount time.
pub const MAX_NESTING_DEPTH: usize = 16;

/// What a route entry resolves to: either a method-keyed handler, or a
/// reference to a whole nested router mounted under the entry's pattern.
pub(crate) enum Target {
    Handler(Option<HttpMethod>, BoxHandler),
    Nested(Router),
}

/// A method-keyed handler slot or nested-router mount point.
pub(crate) struct Entry {
    pub(crate) pattern: Pattern,
    pub(crate) target: Target,
}

/// A path-scoped `use` middleware layer: its handler only runs for
/// requests whose path falls under `pattern`.
pub(crate) struct Layer {
    pub(crate) pattern: Pattern,
    pub(crate) handler: BoxHandler,
}

/// A mutable collection of routes and path-scoped middleware layers.
///
/// Routes are matched in descending specificity order (literal >
/// parameter > wildcard segments), then in registration order among
/// equally-specific candidates. Call [`Router::compile`] to produce
/// an immutable, dispatch-optimized [`crate::router::FlatRouter`] once
/// registration is finished.
#[derive(Default)]
pub struct Router {
    pub(crate) layers: Vec<Layer>,
    pub(crate) entries: Vec<Entry>,
    pub(crate) nested_depth: usize,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `use`-style middleware layer, run ahead of the matched
    /// route's handler for every request whose path falls under `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if `pattern` doesn't compile.
    pub fn layer(&mut self, pattern: &str, handler: BoxHandler) -> Result<&mut Self, RouterError> {
        let pattern = Pattern::compile(pattern)?;
        self.layers.push(Layer { pattern, handler });
        Ok(self)
    }

    /// Register a route. `method: None` matches any method.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if `pattern` doesn't compile.
    pub fn route(
        &mut self,
        method: Option<HttpMethod>,
        pattern: &str,
        handler: BoxHandler,
    ) -> Result<&mut Self, RouterError> {
        let pattern = Pattern::compile(pattern)?;
        self.entries.push(Entry {
            pattern,
            target: Target::Handler(method, handler),
        });
        Ok(self)
    }

    /// Mount `router` as a nested router under `prefix`. All of its routes
    /// and `use` layers are inlined under `prefix` when [`Router::compile`]
    /// flattens this router, and are reachable directly on the unflattened
    /// router too.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if `prefix` doesn't compile
    /// or ends in a wildcard segment (a mount point can't be a catch-all;
    /// there would be nothing left for the nested router to match against).
    /// Returns [`RouterError::NestingTooDeep`] if mounting `router` would
    /// push the combined nesting depth past [`MAX_NESTING_DEPTH`].
    pub fn mount(&mut self, prefix: &str, router: Router) -> Result<&mut Self, RouterError> {
        let pattern = Pattern::compile(prefix)?;
        if pattern.ends_in_wildcard() {
            return Err(RouterError::InvalidPattern(prefix.to_string()));
        }
        let depth = router.nested_depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(RouterError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        self.nested_depth = self.nested_depth.max(depth);
        self.entries.push(Entry {
            pattern,
            target: Target::Nested(router),
        });
        Ok(self)
    }

    pub fn route_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match &e.target {
                Target::Handler(..) => 1,
                Target::Nested(router) => router.route_count(),
            })
            .sum()
    }
}

/// Run `params` through `layers` then the matched route `handler`,
/// honoring [`RouteToken`] control flow. Shared by [`Router::dispatch`]
/// and [`crate::router::FlatRouter::dispatch`].
pub(crate) async fn run_chain(
    layers: &[&BoxHandler],
    handler: &BoxHandler,
    params: &mut RouteParams,
) -> RouteResult {
    for layer in layers {
        match run_stage(layer, params).await? {
            RouteToken::Next => continue,
            other => return Ok(other),
        }
    }
    run_stage(handler, params).await
}

async fn run_stage(stage: &BoxHandler, params: &mut RouteParams) -> RouteResult {
    loop {
        let token = stage(params).await?;
        if token == RouteToken::Suspend {
            if let Some(rx) = params.take_pending_resume() {
                rx.await.map_err(|_| RouterError::HandlerDropped)?;
                continue;
            }
            return Err(RouterError::SuspendWithoutExecutor);
        }
        return Ok(token);
    }
}
