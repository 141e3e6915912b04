use std::sync::Arc;

use crate::parser::body::BodySink;
use crate::parser::config::PreparedConfig;
use crate::parser::engine::{Engine, ParseOutcome, Role};
use crate::parser::error::ParseError;
use crate::parser::header::HeaderView;
use crate::types::{HttpVersion, StatusCode};

/// An incremental HTTP/1 response parser. Same incremental contract as
/// [`crate::parser::RequestParser`], over a status line instead of a
/// request line.
pub struct ResponseParser {
    engine: Engine,
}

impl ResponseParser {
    pub fn new(config: Arc<PreparedConfig>) -> Self {
        Self {
            engine: Engine::new(Role::Response, config),
        }
    }

    pub fn start(&mut self) -> Result<(), ParseError> {
        self.engine.start()
    }

    /// Mark that no body is expected for this response regardless of
    /// framing headers, because the corresponding request's method was
    /// `HEAD`. Call after [`start`](Self::start).
    pub fn start_head_response(&mut self) {
        self.engine.start_head_response();
    }

    pub fn prepare(&mut self) -> &mut [u8] {
        self.engine.prepare()
    }

    pub fn commit(&mut self, n: usize) {
        self.engine.commit(n)
    }

    /// Signal end-of-stream on the underlying connection. Required to
    /// terminate a connection-close-delimited body.
    pub fn commit_eof(&mut self) {
        self.engine.commit_eof()
    }

    pub fn parse(&mut self) -> Result<ParseOutcome, ParseError> {
        self.engine.parse()
    }

    pub fn got_header(&self) -> bool {
        self.engine.got_header()
    }

    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    pub fn status(&self) -> Option<&StatusCode> {
        self.engine.status()
    }

    pub fn version(&self) -> Option<HttpVersion> {
        self.engine.version()
    }

    pub fn get(&self) -> Result<&HeaderView, ParseError> {
        self.engine.header_view()
    }

    pub fn set_body(&mut self, sink: BodySink) -> Result<(), ParseError> {
        self.engine.set_body(sink)
    }

    pub fn pull_body(&self) -> &[u8] {
        self.engine.pull_body()
    }

    pub fn consume_body(&mut self, n: usize) {
        self.engine.consume_body(n)
    }
}
