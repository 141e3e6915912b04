/// What a route handler (or a layer wrapping it) tells the router to do
/// next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteToken {
    /// Continue to the next layer in the current route's middleware
    /// stack.
    Next,
    /// Abandon the current route entirely and try the next matching
    /// route, in registration order.
    NextRoute,
    /// The response is ready; stop the dispatch chain and send it.
    Send,
    /// Cooperatively yield control back to the caller's executor. The
    /// handler's future is parked until [`crate::router::Suspender::resume`]
    /// is called.
    Suspend,
    /// The route has fully handled the request (including writing a
    /// response itself); stop the dispatch chain without sending anything
    /// further.
    Complete,
    /// Close the underlying connection after this response.
    Close,
}
