use futures::channel::oneshot;

use crate::service::ServiceContainer;
use crate::types::{Header, HttpMethod, StatusCode};

/// A handle a suspended handler can be resumed through.
///
/// Obtained from [`RouteParams::suspend`]; the router hands the paired
/// receiver to whatever external event (timer, I/O completion) should
/// wake the handler back up.
pub struct Suspender {
    tx: Option<oneshot::Sender<()>>,
}

impl Suspender {
    /// Wake the suspended handler. A no-op if already resumed or if the
    /// handler's future was dropped.
    pub fn resume(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Per-request state threaded through a route's middleware stack.
pub struct RouteParams {
    method: HttpMethod,
    raw_method: String,
    path: String,
    query: String,
    params: Vec<(String, String)>,

    /// Arbitrary per-request user data, keyed by type.
    pub data: ServiceContainer,

    status: StatusCode,
    response_headers: Vec<Header>,
    response_body: Vec<u8>,

    pending_resume: Option<oneshot::Receiver<()>>,
}

impl RouteParams {
    pub fn new(method: HttpMethod, raw_method: String, path: String, query: String) -> Self {
        Self {
            method,
            raw_method,
            path,
            query,
            params: Vec::new(),
            data: ServiceContainer::new(),
            status: StatusCode::new(200, "OK"),
            response_headers: Vec::new(),
            response_body: Vec::new(),
            pending_resume: None,
        }
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    /// The raw method token as it appeared on the wire, preserved even
    /// for non-standard methods.
    pub fn raw_method(&self) -> &str {
        &self.raw_method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn set_params(&mut self, params: Vec<(String, String)>) {
        self.params = params;
    }

    /// The captured value of a named path parameter, e.g. `:id` or
    /// `*rest`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    // ----- response builder surface -----

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn status(&self) -> &StatusCode {
        &self.status
    }

    pub fn add_header(&mut self, header: Header) {
        self.response_headers.push(header);
    }

    pub fn response_headers(&self) -> &[Header] {
        &self.response_headers
    }

    pub fn write_body(&mut self, bytes: &[u8]) {
        self.response_body.extend_from_slice(bytes);
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response_body
    }

    // ----- suspend/resume -----

    /// Park this request: returns a [`Suspender`] the caller must use to
    /// resume it, and records the paired receiver so the router's
    /// dispatch loop can `await` it before continuing.
    pub fn suspend(&mut self) -> Suspender {
        let (tx, rx) = oneshot::channel();
        self.pending_resume = Some(rx);
        Suspender { tx: Some(tx) }
    }

    pub(crate) fn take_pending_resume(&mut self) -> Option<oneshot::Receiver<()>> {
        self.pending_resume.take()
    }
}
