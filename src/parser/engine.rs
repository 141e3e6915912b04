//! The shared incremental FSM core used by both [`crate::parser::RequestParser`]
//! and [`crate::parser::ResponseParser`].
//!
//! A byte-at-a-time state machine that can drive either a request or a
//! response start line into a shared header/body/trailer pipeline, fed
//! incrementally through `prepare`/`commit`/`parse` rather than a one-shot
//! call, with decoded body bytes routed through an optional codec pipeline
//! into a polymorphic sink.

use std::sync::Arc;

use crate::parser::body::{BodySink, Sink};
use crate::parser::codec::CodecPipeline;
use crate::parser::config::PreparedConfig;
use crate::parser::error::ParseError;
use crate::parser::header::HeaderView;
use crate::types::{Header, HttpMethod, HttpVersion, StatusCode};

/// Outcome of a single [`Engine::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The engine consumed every committed byte and needs more input
    /// before it can make further progress.
    NeedMoreInput,
    /// The message reached its terminal state during this call.
    EndOfMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    // ---- request start line ----
    Method,
    Uri,
    ReqVersion,
    ReqVersionLf,

    // ---- response start line ----
    RespVersion,
    RespVersionSp,
    StatusDigits,
    StatusSp,
    ReasonPhrase,
    RespVersionLf,

    // ---- header section (shared) ----
    HeaderStart,
    HeaderName,
    HeaderValueOws,
    HeaderValue,
    HeaderValueLf,
    EndHeadersLf,

    // ---- bodies ----
    Body,
    BodyUntilEof,

    // ---- chunked transfer encoding ----
    ChunkSize,
    ChunkExt,
    ChunkSizeLf,
    ChunkData,
    ChunkDataCr,
    ChunkDataLf,

    // ---- chunked trailers ----
    TrailerStart,
    TrailerName,
    TrailerValueOws,
    TrailerValue,
    TrailerValueLf,
    TrailerEndLf,

    Complete,
}

/// The shared FSM. Not exposed directly; [`crate::parser::RequestParser`]
/// and [`crate::parser::ResponseParser`] are thin role-specific façades
/// over it (SPEC_FULL.md §3.1).
pub(crate) struct Engine {
    role: Role,
    state: State,
    config: Arc<PreparedConfig>,

    // ----- incremental input buffering -----
    input: Vec<u8>,
    /// Logical length of `input` before the most recent `prepare()` call
    /// extended it with scratch space.
    committed_len: usize,
    /// Read cursor into `input`; bytes before this have been consumed by
    /// `parse()`.
    read_pos: usize,
    eof: bool,

    // ----- start-line accumulation -----
    method_buf: Vec<u8>,
    uri_buf: Vec<u8>,
    version_buf: Vec<u8>,
    status_buf: Vec<u8>,
    reason_buf: Vec<u8>,

    method: Option<HttpMethod>,
    uri: Option<String>,
    version: Option<HttpVersion>,
    status: Option<StatusCode>,

    // ----- header accumulation -----
    header_name_buf: Vec<u8>,
    header_value_buf: Vec<u8>,
    header_bytes_total: usize,
    in_trailers: bool,
    header_view: HeaderView,
    got_header: bool,

    // ----- body framing -----
    head_override: bool,
    body_remaining: u64,
    chunk_size_buf: Vec<u8>,
    chunk_remaining: u64,
    decoded_total: u64,

    // ----- codec + sink -----
    codec: Option<CodecPipeline>,
    sink: BodySink,
    user_sink_installed: bool,
    /// Bytes already delivered out of the default `DynBuf` sink via
    /// `pull_body`/`consume_body`.
    pulled_pos: usize,
    decode_scratch: Vec<u8>,
}

impl Engine {
    pub(crate) fn new(role: Role, config: Arc<PreparedConfig>) -> Self {
        let cfg = config.config();
        let mut e = Self {
            role,
            state: State::Method,
            config,
            input: Vec::with_capacity(cfg.min_buffer),
            committed_len: 0,
            read_pos: 0,
            eof: false,
            method_buf: Vec::with_capacity(16),
            uri_buf: Vec::with_capacity(256),
            version_buf: Vec::with_capacity(16),
            status_buf: Vec::with_capacity(4),
            reason_buf: Vec::with_capacity(32),
            method: None,
            uri: None,
            version: None,
            status: None,
            header_name_buf: Vec::with_capacity(32),
            header_value_buf: Vec::with_capacity(128),
            header_bytes_total: 0,
            in_trailers: false,
            header_view: HeaderView::default(),
            got_header: false,
            head_override: false,
            body_remaining: 0,
            chunk_size_buf: Vec::with_capacity(16),
            chunk_remaining: 0,
            decoded_total: 0,
            codec: None,
            sink: BodySink::default(),
            user_sink_installed: false,
            pulled_pos: 0,
            decode_scratch: Vec::new(),
        };
        e.state = e.initial_state();
        e
    }

    fn initial_state(&self) -> State {
        match self.role {
            Role::Request => State::Method,
            Role::Response => State::RespVersion,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = self.initial_state();
        self.input.clear();
        self.committed_len = 0;
        self.read_pos = 0;
        self.eof = false;
        self.method_buf.clear();
        self.uri_buf.clear();
        self.version_buf.clear();
        self.status_buf.clear();
        self.reason_buf.clear();
        self.method = None;
        self.uri = None;
        self.version = None;
        self.status = None;
        self.header_name_buf.clear();
        self.header_value_buf.clear();
        self.header_bytes_total = 0;
        self.in_trailers = false;
        self.header_view.clear();
        self.got_header = false;
        self.head_override = false;
        self.body_remaining = 0;
        self.chunk_size_buf.clear();
        self.chunk_remaining = 0;
        self.decoded_total = 0;
        self.codec = None;
        self.sink = BodySink::default();
        self.user_sink_installed = false;
        self.pulled_pos = 0;
        self.decode_scratch.clear();
    }

    /// Begin parsing a new message. Requires the previous message (if any)
    /// to have reached `Complete`, or a freshly constructed/reset engine.
    pub(crate) fn start(&mut self) -> Result<(), ParseError> {
        if self.state != self.initial_state() && self.state != State::Complete {
            return Err(ParseError::Precondition(
                "start() called before the previous message completed",
            ));
        }
        self.reset();
        Ok(())
    }

    /// Response parsers only: mark that no body is expected for this
    /// message regardless of framing headers (e.g. because the request
    /// method was HEAD).
    pub(crate) fn start_head_response(&mut self) {
        debug_assert_eq!(self.role, Role::Response);
        self.head_override = true;
    }

    pub(crate) fn got_header(&self) -> bool {
        self.got_header
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    pub(crate) fn header_view(&self) -> Result<&HeaderView, ParseError> {
        if !self.got_header {
            return Err(ParseError::Precondition(
                "get() called before headers were parsed",
            ));
        }
        Ok(&self.header_view)
    }

    pub(crate) fn method(&self) -> Option<&HttpMethod> {
        self.method.as_ref()
    }

    pub(crate) fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub(crate) fn version(&self) -> Option<HttpVersion> {
        self.version
    }

    pub(crate) fn status(&self) -> Option<&StatusCode> {
        self.status.as_ref()
    }

    // ----- incremental input -----

    pub(crate) fn prepare(&mut self) -> &mut [u8] {
        let max_prepare = self.config.config().max_prepare;
        self.committed_len = self.input.len();
        self.input.resize(self.committed_len + max_prepare, 0);
        &mut self.input[self.committed_len..]
    }

    pub(crate) fn commit(&mut self, n: usize) {
        let max_prepare = self.config.config().max_prepare;
        assert!(n <= max_prepare, "commit() exceeds the prepared region");
        self.input.truncate(self.committed_len + n);
    }

    pub(crate) fn commit_eof(&mut self) {
        self.input.truncate(self.committed_len);
        self.eof = true;
    }

    /// Drop already-consumed bytes from the front of the input buffer so
    /// it doesn't grow without bound across many `prepare`/`commit` calls.
    fn compact(&mut self) {
        if self.read_pos == 0 {
            return;
        }
        self.input.drain(0..self.read_pos);
        self.read_pos = 0;
    }

    // ----- body sink -----

    pub(crate) fn set_body(&mut self, sink: BodySink) -> Result<(), ParseError> {
        if !self.got_header {
            return Err(ParseError::Precondition(
                "set_body() requires got_header()",
            ));
        }
        if self.user_sink_installed {
            return Err(ParseError::Precondition("set_body() already called"));
        }
        self.sink = sink;
        self.user_sink_installed = true;
        Ok(())
    }

    pub(crate) fn pull_body(&self) -> &[u8] {
        match self.sink.as_dyn_buf() {
            Some(buf) => &buf.as_slice()[self.pulled_pos..],
            None => &[],
        }
    }

    pub(crate) fn consume_body(&mut self, n: usize) {
        self.pulled_pos += n;
    }

    // ----- main drive loop -----

    pub(crate) fn parse(&mut self) -> Result<ParseOutcome, ParseError> {
        loop {
            if self.state == State::Complete {
                return Ok(ParseOutcome::EndOfMessage);
            }

            match self.state {
                State::Body => {
                    if !self.advance_fixed_body()? {
                        return Ok(ParseOutcome::NeedMoreInput);
                    }
                    continue;
                }
                State::BodyUntilEof => {
                    if !self.advance_body_until_eof()? {
                        return Ok(ParseOutcome::NeedMoreInput);
                    }
                    continue;
                }
                State::ChunkData => {
                    if !self.advance_chunk_data()? {
                        return Ok(ParseOutcome::NeedMoreInput);
                    }
                    continue;
                }
                _ => {}
            }

            if self.read_pos >= self.input.len() {
                self.compact();
                return Ok(ParseOutcome::NeedMoreInput);
            }

            let byte = self.input[self.read_pos];
            self.read_pos += 1;
            if let Err(e) = self.step(byte) {
                log::debug!("parse error in state {:?}: {e}", self.state);
                return Err(e);
            }

            if self.state == State::Complete {
                log::trace!("message complete ({:?})", self.role);
                self.compact();
                return Ok(ParseOutcome::EndOfMessage);
            }
        }
    }

    fn step(&mut self, byte: u8) -> Result<(), ParseError> {
        match self.state {
            // ===================== REQUEST START LINE =====================
            State::Method => {
                if byte == b' ' {
                    self.method = Some(HttpMethod::from_bytes(&self.method_buf));
                    self.state = State::Uri;
                } else if is_tchar(byte) {
                    if self.method_buf.len() >= self.config.config().max_method_len {
                        return Err(ParseError::InvalidMethod("method too long".into()));
                    }
                    self.method_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "token character or SP in request method",
                        found: byte,
                    });
                }
            }
            State::Uri => {
                if byte == b' ' {
                    if self.uri_buf.is_empty() {
                        return Err(ParseError::InvalidUri("empty URI".into()));
                    }
                    self.uri = Some(String::from_utf8_lossy(&self.uri_buf).into_owned());
                    self.state = State::ReqVersion;
                } else if byte > b' ' && byte != 0x7F {
                    if self.uri_buf.len() >= self.config.config().max_uri_len {
                        return Err(ParseError::InvalidUri("URI too long".into()));
                    }
                    self.uri_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "visible character or SP in request URI",
                        found: byte,
                    });
                }
            }
            State::ReqVersion => {
                if byte == b'\r' {
                    self.version = Some(HttpVersion::from_bytes(&self.version_buf)?);
                    self.state = State::ReqVersionLf;
                } else if byte >= b' ' && byte != 0x7F {
                    if self.version_buf.len() >= 16 {
                        return Err(ParseError::InvalidVersion("version too long".into()));
                    }
                    self.version_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "version character or CR",
                        found: byte,
                    });
                }
            }
            State::ReqVersionLf => {
                if byte == b'\n' {
                    self.state = State::HeaderStart;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after version CR",
                        found: byte,
                    });
                }
            }

            // ===================== RESPONSE START LINE =====================
            State::RespVersion => {
                if byte == b' ' {
                    self.version = Some(HttpVersion::from_bytes(&self.version_buf)?);
                    self.state = State::RespVersionSp;
                } else if byte > b' ' && byte != 0x7F {
                    if self.version_buf.len() >= 16 {
                        return Err(ParseError::InvalidVersion("version too long".into()));
                    }
                    self.version_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "version character or SP",
                        found: byte,
                    });
                }
            }
            State::RespVersionSp => {
                if byte.is_ascii_digit() {
                    self.status_buf.push(byte);
                    self.state = State::StatusDigits;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "status code digit",
                        found: byte,
                    });
                }
            }
            State::StatusDigits => {
                if byte == b' ' {
                    self.state = State::StatusSp;
                } else if byte.is_ascii_digit() {
                    if self.status_buf.len() >= 3 {
                        return Err(ParseError::InvalidStatusCode(
                            String::from_utf8_lossy(&self.status_buf).into_owned(),
                        ));
                    }
                    self.status_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "status code digit or SP",
                        found: byte,
                    });
                }
            }
            State::StatusSp => {
                if byte == b'\r' {
                    self.finish_status_line()?;
                    self.state = State::RespVersionLf;
                } else if byte >= b' ' && byte != 0x7F {
                    self.reason_buf.push(byte);
                    self.state = State::ReasonPhrase;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "reason phrase character or CR",
                        found: byte,
                    });
                }
            }
            State::ReasonPhrase => {
                if byte == b'\r' {
                    self.finish_status_line()?;
                    self.state = State::RespVersionLf;
                } else if byte >= b' ' && byte != 0x7F {
                    self.reason_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "reason phrase character or CR",
                        found: byte,
                    });
                }
            }
            State::RespVersionLf => {
                if byte == b'\n' {
                    self.state = State::HeaderStart;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after status line CR",
                        found: byte,
                    });
                }
            }

            // ===================== HEADERS =====================
            State::HeaderStart => {
                if byte == b'\r' {
                    self.state = State::EndHeadersLf;
                } else if is_tchar(byte) {
                    self.check_header_count()?;
                    self.header_name_buf.clear();
                    self.header_name_buf.push(byte);
                    self.state = State::HeaderName;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "header name character or CR",
                        found: byte,
                    });
                }
            }
            State::HeaderName => {
                if byte == b':' {
                    self.header_value_buf.clear();
                    self.state = State::HeaderValueOws;
                } else if is_tchar(byte) {
                    if self.header_name_buf.len() >= self.config.config().max_header_name_len {
                        return Err(ParseError::HeaderTooLarge);
                    }
                    self.header_name_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "header name character or ':'",
                        found: byte,
                    });
                }
            }
            State::HeaderValueOws => {
                if byte == b' ' || byte == b'\t' {
                    // skip OWS
                } else if byte == b'\r' {
                    self.store_current_header()?;
                    self.state = State::HeaderValueLf;
                } else if is_field_content_byte(byte) {
                    self.header_value_buf.push(byte);
                    self.state = State::HeaderValue;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "header value character, OWS, or CR",
                        found: byte,
                    });
                }
            }
            State::HeaderValue => {
                if byte == b'\r' {
                    trim_trailing_ows(&mut self.header_value_buf);
                    self.store_current_header()?;
                    self.state = State::HeaderValueLf;
                } else if is_field_content_byte(byte) {
                    if self.header_value_buf.len() >= self.config.config().max_header_value_len {
                        return Err(ParseError::HeaderTooLarge);
                    }
                    self.header_value_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "header value character or CR",
                        found: byte,
                    });
                }
            }
            State::HeaderValueLf => {
                if byte == b'\n' {
                    self.state = State::HeaderStart;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after header value CR",
                        found: byte,
                    });
                }
            }
            State::EndHeadersLf => {
                if byte == b'\n' {
                    self.got_header = true;
                    self.determine_body_handling()?;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after end-of-headers CR",
                        found: byte,
                    });
                }
            }

            // ===================== CHUNKED ENCODING =====================
            State::ChunkSize => {
                if byte == b'\r' {
                    self.apply_chunk_size()?;
                    self.state = State::ChunkSizeLf;
                } else if byte == b';' {
                    self.apply_chunk_size()?;
                    self.state = State::ChunkExt;
                } else if byte.is_ascii_hexdigit() {
                    self.chunk_size_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "hex digit, ';', or CR in chunk size",
                        found: byte,
                    });
                }
            }
            State::ChunkExt => {
                // RFC 9112 §7.1.1: ignore chunk extensions.
                if byte == b'\r' {
                    self.state = State::ChunkSizeLf;
                }
            }
            State::ChunkSizeLf => {
                if byte == b'\n' {
                    if self.chunk_remaining == 0 {
                        self.in_trailers = true;
                        self.state = State::TrailerStart;
                    } else {
                        self.state = State::ChunkData;
                    }
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after chunk size CR",
                        found: byte,
                    });
                }
            }
            State::ChunkDataCr => {
                if byte == b'\r' {
                    self.state = State::ChunkDataLf;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "CR after chunk data",
                        found: byte,
                    });
                }
            }
            State::ChunkDataLf => {
                if byte == b'\n' {
                    self.chunk_size_buf.clear();
                    self.state = State::ChunkSize;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after chunk data CR",
                        found: byte,
                    });
                }
            }

            // ===================== TRAILERS =====================
            State::TrailerStart => {
                if byte == b'\r' {
                    self.state = State::TrailerEndLf;
                } else if is_tchar(byte) {
                    self.header_name_buf.clear();
                    self.header_name_buf.push(byte);
                    self.state = State::TrailerName;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "trailer name character or CR",
                        found: byte,
                    });
                }
            }
            State::TrailerName => {
                if byte == b':' {
                    self.header_value_buf.clear();
                    self.state = State::TrailerValueOws;
                } else if is_tchar(byte) {
                    self.header_name_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "trailer name character or ':'",
                        found: byte,
                    });
                }
            }
            State::TrailerValueOws => {
                if byte == b' ' || byte == b'\t' {
                } else if byte == b'\r' {
                    self.store_current_trailer();
                    self.state = State::TrailerValueLf;
                } else if is_field_content_byte(byte) {
                    self.header_value_buf.push(byte);
                    self.state = State::TrailerValue;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "trailer value character, OWS, or CR",
                        found: byte,
                    });
                }
            }
            State::TrailerValue => {
                if byte == b'\r' {
                    trim_trailing_ows(&mut self.header_value_buf);
                    self.store_current_trailer();
                    self.state = State::TrailerValueLf;
                } else if is_field_content_byte(byte) {
                    self.header_value_buf.push(byte);
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "trailer value character or CR",
                        found: byte,
                    });
                }
            }
            State::TrailerValueLf => {
                if byte == b'\n' {
                    self.state = State::TrailerStart;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after trailer value CR",
                        found: byte,
                    });
                }
            }
            State::TrailerEndLf => {
                if byte == b'\n' {
                    self.finish_body()?;
                    self.state = State::Complete;
                } else {
                    return Err(ParseError::UnexpectedByte {
                        expected: "LF after trailer-section end CR",
                        found: byte,
                    });
                }
            }

            State::Body | State::BodyUntilEof | State::ChunkData | State::Complete => {
                unreachable!("handled by the bulk-copy paths in parse()")
            }
        }
        Ok(())
    }

    // ----- bulk body copy paths -----

    /// Returns `false` if blocked on more input.
    fn advance_fixed_body(&mut self) -> Result<bool, ParseError> {
        let available = self.input.len() - self.read_pos;
        if available == 0 {
            self.compact();
            return Ok(false);
        }
        let to_copy = (available as u64).min(self.body_remaining) as usize;
        let chunk = &self.input[self.read_pos..self.read_pos + to_copy];
        self.deliver_decoded(chunk)?;
        self.read_pos += to_copy;
        self.body_remaining -= to_copy as u64;
        if self.body_remaining == 0 {
            self.finish_body()?;
            self.state = State::Complete;
        }
        Ok(true)
    }

    fn advance_body_until_eof(&mut self) -> Result<bool, ParseError> {
        let available = self.input.len() - self.read_pos;
        if available > 0 {
            let chunk_start = self.read_pos;
            self.read_pos = self.input.len();
            let chunk = self.input[chunk_start..].to_vec();
            self.deliver_decoded(&chunk)?;
        }
        if self.eof {
            self.finish_body()?;
            self.state = State::Complete;
            return Ok(true);
        }
        self.compact();
        Ok(false)
    }

    fn advance_chunk_data(&mut self) -> Result<bool, ParseError> {
        let available = self.input.len() - self.read_pos;
        if available == 0 {
            self.compact();
            return Ok(false);
        }
        let to_copy = (available as u64).min(self.chunk_remaining) as usize;
        let chunk = &self.input[self.read_pos..self.read_pos + to_copy];
        self.deliver_decoded(chunk)?;
        self.read_pos += to_copy;
        self.chunk_remaining -= to_copy as u64;
        if self.chunk_remaining == 0 {
            self.state = State::ChunkDataCr;
        }
        Ok(true)
    }

    /// Run raw wire bytes through the codec pipeline (if any) and deliver
    /// the decoded result to the installed sink, enforcing `body_limit`
    /// against *decoded* byte count.
    fn deliver_decoded(&mut self, raw: &[u8]) -> Result<(), ParseError> {
        self.decode_scratch.clear();
        match &mut self.codec {
            Some(pipeline) => pipeline.push(raw, &mut self.decode_scratch)?,
            None => self.decode_scratch.extend_from_slice(raw),
        }
        if self.decode_scratch.is_empty() {
            return Ok(());
        }
        self.decoded_total += self.decode_scratch.len() as u64;
        if self.decoded_total > self.config.config().body_limit {
            return Err(ParseError::BodyTooLarge);
        }
        let scratch = std::mem::take(&mut self.decode_scratch);
        self.sink.write(&scratch, true)?;
        self.decode_scratch = scratch;
        self.decode_scratch.clear();
        Ok(())
    }

    fn finish_body(&mut self) -> Result<(), ParseError> {
        if let Some(pipeline) = self.codec.take() {
            let mut tail = Vec::new();
            pipeline.finish(&mut tail)?;
            if !tail.is_empty() {
                self.decoded_total += tail.len() as u64;
                if self.decoded_total > self.config.config().body_limit {
                    return Err(ParseError::BodyTooLarge);
                }
                self.sink.write(&tail, false)?;
            }
        }
        Ok(())
    }

    // ----- helpers -----

    fn check_header_count(&self) -> Result<(), ParseError> {
        if self.header_view.headers().len() >= self.config.config().max_headers_count {
            return Err(ParseError::TooManyHeaders);
        }
        Ok(())
    }

    fn store_current_header(&mut self) -> Result<(), ParseError> {
        let entry_len = self.header_name_buf.len() + self.header_value_buf.len() + 4;
        self.header_bytes_total += entry_len;
        if self.header_bytes_total > self.config.config().max_total_header_bytes {
            return Err(ParseError::HeaderTooLarge);
        }
        let name = String::from_utf8_lossy(&self.header_name_buf).into_owned();
        let value = String::from_utf8_lossy(&self.header_value_buf).into_owned();
        self.header_view.push(Header { name, value });
        Ok(())
    }

    /// Trailers use a lenient "discard silently if it doesn't fit" policy,
    /// rather than erroring the whole message.
    fn store_current_trailer(&mut self) {
        let entry_len = self.header_name_buf.len() + self.header_value_buf.len() + 4;
        if self.header_bytes_total + entry_len > self.config.config().max_total_header_bytes
            || self.header_view.trailers().len() >= self.config.config().max_headers_count
        {
            return;
        }
        self.header_bytes_total += entry_len;
        let name = String::from_utf8_lossy(&self.header_name_buf).into_owned();
        let value = String::from_utf8_lossy(&self.header_value_buf).into_owned();
        self.header_view.push_trailer(Header { name, value });
    }

    fn finish_status_line(&mut self) -> Result<(), ParseError> {
        let code_str = String::from_utf8_lossy(&self.status_buf);
        let code: u16 = code_str
            .parse()
            .map_err(|_| ParseError::InvalidStatusCode(code_str.into_owned()))?;
        let reason = String::from_utf8_lossy(&self.reason_buf).into_owned();
        self.status = Some(StatusCode::new(code, reason));
        Ok(())
    }

    fn apply_chunk_size(&mut self) -> Result<(), ParseError> {
        if self.chunk_size_buf.is_empty() {
            return Err(ParseError::InvalidChunkSize("empty chunk size".into()));
        }
        let size_str = String::from_utf8_lossy(&self.chunk_size_buf);
        let size = u64::from_str_radix(size_str.trim(), 16)
            .map_err(|_| ParseError::InvalidChunkSize(size_str.into_owned()))?;
        self.chunk_remaining = size;
        Ok(())
    }

    /// Body framing selection, in precedence order:
    /// 1. explicit no-body override (HEAD response / 1xx / 204 / 304)
    /// 2. `Transfer-Encoding: chunked`
    /// 3. `Content-Length`
    /// 4. otherwise: response -> connection-close delimited, request ->
    ///    zero-length body.
    fn determine_body_handling(&mut self) -> Result<(), ParseError> {
        let forbids_body = self.head_override
            || matches!(&self.status, Some(s) if s.forbids_body());

        if forbids_body {
            self.finish_body()?;
            self.state = State::Complete;
            return Ok(());
        }

        if self.header_view.has_chunked_transfer_encoding() {
            self.install_codec_if_needed()?;
            self.chunk_size_buf.clear();
            self.state = State::ChunkSize;
            return Ok(());
        }

        if self.header_view.has_content_length() {
            let values: Vec<&str> = self
                .header_view
                .get_all("content-length")
                .map(str::trim)
                .collect();
            let first = values[0];
            if !values.iter().all(|v| *v == first) {
                return Err(ParseError::InvalidContentLength(
                    "multiple differing Content-Length values".into(),
                ));
            }
            let length: u64 = first
                .parse()
                .map_err(|_| ParseError::InvalidContentLength(first.to_string()))?;

            if length == 0 {
                self.finish_body()?;
                self.state = State::Complete;
            } else {
                self.install_codec_if_needed()?;
                self.body_remaining = length;
                self.state = State::Body;
            }
            return Ok(());
        }

        match self.role {
            Role::Response => {
                self.install_codec_if_needed()?;
                self.state = State::BodyUntilEof;
            }
            Role::Request => {
                self.finish_body()?;
                self.state = State::Complete;
            }
        }
        Ok(())
    }

    fn install_codec_if_needed(&mut self) -> Result<(), ParseError> {
        let codings = self.header_view.content_codings();
        if codings.is_empty() {
            return Ok(());
        }
        let cfg = self.config.config();
        for coding in codings {
            let enabled = match coding {
                crate::parser::header::Coding::Gzip => cfg.apply_gzip_decoder,
                crate::parser::header::Coding::Deflate => cfg.apply_deflate_decoder,
                crate::parser::header::Coding::Br => cfg.apply_brotli_decoder,
            };
            if !enabled {
                return Err(ParseError::UnsupportedContentEncoding(format!(
                    "{coding:?}"
                )));
            }
        }
        self.codec = Some(CodecPipeline::new(codings));
        Ok(())
    }
}

#[inline]
fn trim_trailing_ows(buf: &mut Vec<u8>) {
    while buf.last().is_some_and(|&b| b == b' ' || b == b'\t') {
        buf.pop();
    }
}

/// `tchar` — characters allowed in HTTP tokens (method, header names).
#[inline]
fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

/// Bytes permitted inside a header field value: `SP / HTAB / VCHAR / obs-text`.
#[inline]
fn is_field_content_byte(b: u8) -> bool {
    b == b' ' || b == b'\t' || (0x21..=0x7E).contains(&b) || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tchar_accepts_valid_bytes() {
        for &b in b"abcXYZ019!#$%&'*+-.^_`|~" {
            assert!(is_tchar(b));
        }
    }

    #[test]
    fn tchar_rejects_invalid_bytes() {
        for &b in b" \t\r\n@[]{}" {
            assert!(!is_tchar(b));
        }
    }

    #[test]
    fn field_content_byte_accepts_sp_htab_vchar_obstext() {
        assert!(is_field_content_byte(b' '));
        assert!(is_field_content_byte(b'\t'));
        assert!(is_field_content_byte(b'A'));
        assert!(is_field_content_byte(0x80));
        assert!(is_field_content_byte(0xFF));
    }

    #[test]
    fn field_content_byte_rejects_ctl() {
        assert!(!is_field_content_byte(0x00));
        assert!(!is_field_content_byte(0x1F));
        assert!(!is_field_content_byte(0x7F));
    }
}
