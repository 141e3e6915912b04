use std::sync::Arc;

use crate::parser::body::BodySink;
use crate::parser::config::PreparedConfig;
use crate::parser::engine::{Engine, ParseOutcome, Role};
use crate::parser::error::ParseError;
use crate::parser::header::HeaderView;
use crate::types::{HttpMethod, HttpVersion};

/// An incremental HTTP/1 request parser.
///
/// Built once per connection (or pooled) against a shared
/// [`PreparedConfig`]; [`start`](Self::start) resets it to parse the next
/// request on the same connection.
pub struct RequestParser {
    engine: Engine,
}

impl RequestParser {
    pub fn new(config: Arc<PreparedConfig>) -> Self {
        Self {
            engine: Engine::new(Role::Request, config),
        }
    }

    /// Begin parsing a new request. Must be called before the first use,
    /// and again before each subsequent request on a reused parser.
    pub fn start(&mut self) -> Result<(), ParseError> {
        self.engine.start()
    }

    /// Hand back a scratch region to fill with the next chunk of wire
    /// bytes read from the connection.
    pub fn prepare(&mut self) -> &mut [u8] {
        self.engine.prepare()
    }

    /// Declare that the first `n` bytes of the region returned by the most
    /// recent [`prepare`](Self::prepare) call hold valid wire data.
    pub fn commit(&mut self, n: usize) {
        self.engine.commit(n)
    }

    /// Signal that the underlying connection has reached end-of-stream;
    /// only meaningful while reading a body with no declared length. On
    /// the request side, absent framing headers mean a zero-length body,
    /// so this mainly unblocks a connection-close-delimited read on a
    /// malformed or unusual client.
    pub fn commit_eof(&mut self) {
        self.engine.commit_eof()
    }

    /// Advance the state machine over whatever has been committed so far.
    pub fn parse(&mut self) -> Result<ParseOutcome, ParseError> {
        self.engine.parse()
    }

    pub fn got_header(&self) -> bool {
        self.engine.got_header()
    }

    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    pub fn method(&self) -> Option<&HttpMethod> {
        self.engine.method()
    }

    pub fn uri(&self) -> Option<&str> {
        self.engine.uri()
    }

    pub fn version(&self) -> Option<HttpVersion> {
        self.engine.version()
    }

    /// The parsed header view. Valid only once [`got_header`](Self::got_header)
    /// is `true`.
    pub fn get(&self) -> Result<&HeaderView, ParseError> {
        self.engine.header_view()
    }

    /// Install a custom body destination. Must be called after
    /// [`got_header`](Self::got_header) becomes `true` and before the body
    /// has been read; may be called at most once per message.
    pub fn set_body(&mut self, sink: BodySink) -> Result<(), ParseError> {
        self.engine.set_body(sink)
    }

    /// Decoded body bytes accumulated so far in the default in-memory
    /// sink, starting from the last [`consume_body`](Self::consume_body)
    /// offset. Empty if a custom sink was installed via
    /// [`set_body`](Self::set_body).
    pub fn pull_body(&self) -> &[u8] {
        self.engine.pull_body()
    }

    /// Advance the read offset into the default sink's buffer by `n`
    /// bytes.
    pub fn consume_body(&mut self, n: usize) {
        self.engine.consume_body(n)
    }
}
