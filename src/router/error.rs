use std::fmt;

/// Errors raised while building or dispatching through a router.
///
/// Disjoint from [`crate::parser::ParseError`]'s numeric space — see
/// [`CATEGORY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A router was mounted ([`crate::router::Router::mount`]) at a nesting
    /// depth beyond [`crate::router::MAX_NESTING_DEPTH`].
    NestingTooDeep { depth: usize, max: usize },
    /// A route pattern is malformed (e.g. an empty segment, or a wildcard
    /// that isn't the final segment).
    InvalidPattern(String),
    /// No installed route matched the request path/method.
    NoMatch,
    /// A handler returned [`crate::router::RouteToken::NextRoute`] but no
    /// routes remained to try.
    ExhaustedRoutes,
    /// A handler suspended but the router has no executor context able to
    /// resume it.
    SuspendWithoutExecutor,
    /// A handler's boxed future panicked or its oneshot channel was
    /// dropped before resuming.
    HandlerDropped,
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NestingTooDeep { depth, max } => {
                write!(f, "router nesting depth {depth} exceeds maximum {max}")
            }
            Self::InvalidPattern(p) => write!(f, "invalid route pattern: '{p}'"),
            Self::NoMatch => write!(f, "no route matched the request"),
            Self::ExhaustedRoutes => write!(f, "next_route() called with no routes remaining"),
            Self::SuspendWithoutExecutor => {
                write!(f, "suspend() called with no resuming executor")
            }
            Self::HandlerDropped => write!(f, "handler future was dropped before completing"),
        }
    }
}

impl std::error::Error for RouterError {}

pub const CATEGORY: &str = "wireframe.router";

impl RouterError {
    pub fn code(&self) -> u32 {
        match self {
            Self::NestingTooDeep { .. } => 1,
            Self::InvalidPattern(_) => 2,
            Self::NoMatch => 3,
            Self::ExhaustedRoutes => 4,
            Self::SuspendWithoutExecutor => 5,
            Self::HandlerDropped => 6,
        }
    }
}
