//! Coroutine-style request router.
//!
//! Handlers are boxed futures driven through a small set of control
//! tokens ([`RouteToken`]) instead of a plain return value, so a handler
//! can suspend mid-dispatch and resume later without blocking a thread,
//! using `futures`' boxed futures and oneshot channels.

mod control;
mod error;
mod flat;
mod layer;
mod params;
mod pattern;

pub use control::RouteToken;
pub use error::{RouterError, CATEGORY};
pub use flat::FlatRouter;
pub use layer::{BoxFuture, BoxHandler, Router, RouteResult, MAX_NESTING_DEPTH};
pub use params::{RouteParams, Suspender};
pub use pattern::Pattern;
