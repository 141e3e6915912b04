use crate::router::control::RouteToken;
use crate::router::error::RouterError;
use crate::router::layer::{run_chain, BoxHandler, Entry, Layer, RouteResult, Router, Target};
use crate::router::params::RouteParams;
use crate::router::pattern::Pattern;
use crate::types::HttpMethod;

type Candidate<'a> = (Vec<u8>, Vec<(String, String)>, &'a BoxHandler);

impl Router {
    /// Match and dispatch a single request through this router's layers
    /// and routes, recursing into any nested routers reachable from it.
    pub async fn dispatch(&self, params: &mut RouteParams) -> RouteResult {
        let path = params.path().to_string();
        let method = params.method().clone();
        let mut layers = Vec::new();
        let mut candidates = self.resolve(&method, &path, &mut layers);
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        dispatch_candidates(&layers, candidates, params).await
    }

    /// Recursively collect every path-scoped `use` layer whose pattern
    /// matches `path` (depth-first, in registration order) into
    /// `layers_out`, and return the candidate route handlers for
    /// `method`/`path` found in this router and any nested routers it
    /// mounts, each paired with its pattern specificity and captured
    /// params. The returned list is unsorted; callers sort by
    /// specificity (stable, to preserve registration-order ties).
    fn resolve<'a>(
        &'a self,
        method: &HttpMethod,
        path: &str,
        layers_out: &mut Vec<&'a BoxHandler>,
    ) -> Vec<Candidate<'a>> {
        for layer in &self.layers {
            if layer.pattern.match_prefix(path).is_some() {
                layers_out.push(&layer.handler);
            }
        }

        let mut found = Vec::new();
        for entry in &self.entries {
            match &entry.target {
                Target::Handler(m, handler) => {
                    if m.as_ref().is_none_or(|mm| mm == method) {
                        if let Some(captures) = entry.pattern.matches(path) {
                            found.push((entry.pattern.specificity(), captures, handler));
                        }
                    }
                }
                Target::Nested(router) => {
                    if let Some((prefix_captures, remainder)) = entry.pattern.match_prefix(path) {
                        let nested = router.resolve(method, &remainder, layers_out);
                        for (spec, captures, handler) in nested {
                            let mut merged_spec = entry.pattern.specificity();
                            merged_spec.extend(spec);
                            let mut merged_captures = prefix_captures.clone();
                            merged_captures.extend(captures);
                            found.push((merged_spec, merged_captures, handler));
                        }
                    }
                }
            }
        }
        found
    }
}

async fn dispatch_candidates(
    layers: &[&BoxHandler],
    candidates: Vec<Candidate<'_>>,
    params: &mut RouteParams,
) -> RouteResult {
    if candidates.is_empty() {
        log::debug!("no route matched {} {}", params.method(), params.path());
        return Err(RouterError::NoMatch);
    }
    for (_, captures, handler) in candidates {
        params.set_params(captures);
        match run_chain(layers, handler, params).await? {
            RouteToken::NextRoute => continue,
            other => return Ok(other),
        }
    }
    log::debug!("exhausted all candidate routes for {} {}", params.method(), params.path());
    Err(RouterError::ExhaustedRoutes)
}

/// Depth-first flatten `router` into `layers`/`entries`, concatenating
/// `prefix` (the mount pattern of any ancestor router) onto every pattern
/// along the way. `entries` never contains a [`Target::Nested`] once this
/// returns — nested routers are inlined away.
fn flatten_into(router: Router, prefix: Option<&Pattern>, layers: &mut Vec<Layer>, entries: &mut Vec<Entry>) {
    for layer in router.layers {
        let pattern = match prefix {
            Some(p) => p.concat(&layer.pattern),
            None => layer.pattern,
        };
        layers.push(Layer {
            pattern,
            handler: layer.handler,
        });
    }
    for entry in router.entries {
        let pattern = match prefix {
            Some(p) => p.concat(&entry.pattern),
            None => entry.pattern,
        };
        match entry.target {
            Target::Handler(method, handler) => entries.push(Entry {
                pattern,
                target: Target::Handler(method, handler),
            }),
            Target::Nested(nested) => flatten_into(nested, Some(&pattern), layers, entries),
        }
    }
}

/// Candidate route indices for `path`/`method` against `entries`, ordered
/// by descending pattern specificity and then by registration order.
/// Only used against an already-flattened `entries` slice, where every
/// `target` is a [`Target::Handler`].
fn candidates(entries: &[Entry], method: &HttpMethod, path: &str) -> Vec<(usize, Vec<(String, String)>)> {
    let mut found: Vec<(usize, Vec<(String, String)>)> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, e)| match &e.target {
            Target::Handler(m, _) if m.as_ref().is_none_or(|mm| mm == method) => {
                e.pattern.matches(path).map(|caps| (i, caps))
            }
            _ => None,
        })
        .collect();
    found.sort_by(|(ia, _), (ib, _)| {
        let sa = entries[*ia].pattern.specificity();
        let sb = entries[*ib].pattern.specificity();
        sb.cmp(&sa).then(ia.cmp(ib))
    });
    found
}

async fn dispatch_over(
    layers: &[&BoxHandler],
    entries: &[Entry],
    order: &[(usize, Vec<(String, String)>)],
    params: &mut RouteParams,
) -> RouteResult {
    if order.is_empty() {
        log::debug!("no route matched {} {}", params.method(), params.path());
        return Err(RouterError::NoMatch);
    }
    for (idx, captures) in order {
        params.set_params(captures.clone());
        let handler = match &entries[*idx].target {
            Target::Handler(_, h) => h,
            Target::Nested(_) => unreachable!("flat router entries are never nested"),
        };
        match run_chain(layers, handler, params).await? {
            RouteToken::NextRoute => continue,
            other => return Ok(other),
        }
    }
    log::debug!("exhausted all candidate routes for {} {}", params.method(), params.path());
    Err(RouterError::ExhaustedRoutes)
}

impl Router {
    /// Flatten this router into an immutable, dispatch-optimized form.
    /// Nested routers are inlined with path-prefix concatenation, and
    /// candidate ordering for every distinct method seen at compile time
    /// is precomputed once, trading registration-time flexibility for
    /// dispatch-time speed.
    pub fn compile(self) -> FlatRouter {
        let mut layers = Vec::new();
        let mut entries = Vec::new();
        flatten_into(self, None, &mut layers, &mut entries);

        let mut distinct_methods: Vec<HttpMethod> = entries
            .iter()
            .filter_map(|e| match &e.target {
                Target::Handler(Some(m), _) => Some(m.clone()),
                _ => None,
            })
            .collect();
        distinct_methods.sort_by_key(|m| m.as_str().to_string());
        distinct_methods.dedup();

        let mut by_method = Vec::with_capacity(distinct_methods.len());
        for method in &distinct_methods {
            // Precompute order against a representative path is not
            // possible (paths are runtime values), so what's cached here
            // is the entries applicable to this method, pre-sorted by
            // specificity; path matching itself still runs per dispatch.
            let mut applicable: Vec<usize> = entries
                .iter()
                .enumerate()
                .filter(|(_, e)| match &e.target {
                    Target::Handler(m, _) => m.as_ref().is_none_or(|mm| mm == method),
                    Target::Nested(_) => false,
                })
                .map(|(i, _)| i)
                .collect();
            applicable.sort_by(|a, b| {
                entries[*b]
                    .pattern
                    .specificity()
                    .cmp(&entries[*a].pattern.specificity())
                    .then(a.cmp(b))
            });
            by_method.push((method.clone(), applicable));
        }

        FlatRouter {
            layers,
            entries,
            by_method,
        }
    }
}

/// An immutable, compiled router. Thread-safe for concurrent
/// dispatch: nothing about resolving or running a request mutates shared
/// state outside of the per-request [`RouteParams`].
pub struct FlatRouter {
    layers: Vec<Layer>,
    entries: Vec<Entry>,
    by_method: Vec<(HttpMethod, Vec<usize>)>,
}

impl FlatRouter {
    pub async fn dispatch(&self, params: &mut RouteParams) -> RouteResult {
        let path = params.path().to_string();
        let matching_layers: Vec<&BoxHandler> = self
            .layers
            .iter()
            .filter(|l| l.pattern.match_prefix(&path).is_some())
            .map(|l| &l.handler)
            .collect();

        let precomputed = self
            .by_method
            .iter()
            .find(|(m, _)| m == params.method())
            .map(|(_, idxs)| idxs.as_slice());

        let order: Vec<(usize, Vec<(String, String)>)> = match precomputed {
            Some(idxs) => idxs
                .iter()
                .filter_map(|&i| self.entries[i].pattern.matches(&path).map(|c| (i, c)))
                .collect(),
            None => candidates(&self.entries, params.method(), &path),
        };

        dispatch_over(&matching_layers, &self.entries, &order, params).await
    }

    pub fn route_count(&self) -> usize {
        self.entries.len()
    }
}
