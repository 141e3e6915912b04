//! Message serialization, symmetric to the parser. Builds a
//! start-line + header block into a prefix buffer, then streams body
//! bytes through an optional codec chain, emitting chunked framing if
//! requested.

mod encoder;

use encoder::EncodePipeline;

use crate::parser::header::Coding;
use crate::parser::ParseError;
use crate::types::{Header, HttpMethod, HttpVersion, StatusCode};

/// Builds one HTTP/1 message (request or response) into a byte buffer.
///
/// Mirrors the parser's `prepare`/`commit` incremental discipline in
/// reverse: callers write the start line, then headers, then call
/// [`finish_headers`](Self::finish_headers) before streaming body bytes
/// through [`write_body`](Self::write_body).
pub struct Serializer {
    buf: Vec<u8>,
    chunked: bool,
    encoder: Option<EncodePipeline>,
    headers_finished: bool,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(512),
            chunked: false,
            encoder: None,
            headers_finished: false,
        }
    }

    pub fn write_request_line(&mut self, method: &HttpMethod, uri: &str, version: HttpVersion) {
        self.buf
            .extend_from_slice(format!("{method} {uri} {version}\r\n").as_bytes());
    }

    pub fn write_status_line(&mut self, status: &StatusCode, version: HttpVersion) {
        self.buf
            .extend_from_slice(format!("{version} {status}\r\n").as_bytes());
    }

    pub fn write_header(&mut self, header: &Header) {
        self.buf
            .extend_from_slice(format!("{}: {}\r\n", header.name, header.value).as_bytes());
    }

    /// Frame the body with `Transfer-Encoding: chunked` instead of a
    /// known `Content-Length`. Call before [`finish_headers`](Self::finish_headers).
    pub fn enable_chunked(&mut self) {
        self.chunked = true;
    }

    /// Compress body bytes written via [`write_body`](Self::write_body)
    /// through the given content-codings, applied in the order listed.
    /// The caller is responsible for also writing a matching
    /// `Content-Encoding` header.
    pub fn enable_content_encoding(&mut self, codings: &[Coding]) {
        if !codings.is_empty() {
            self.encoder = Some(EncodePipeline::new(codings));
        }
    }

    pub fn finish_headers(&mut self) {
        self.buf.extend_from_slice(b"\r\n");
        self.headers_finished = true;
    }

    /// Write a chunk of body bytes, compressing and/or chunk-framing as
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Precondition`] if called before
    /// [`finish_headers`](Self::finish_headers), or [`ParseError::Codec`]
    /// if a configured encoder fails.
    pub fn write_body(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        if !self.headers_finished {
            return Err(ParseError::Precondition(
                "write_body() called before finish_headers()",
            ));
        }
        let mut encoded = Vec::new();
        match &mut self.encoder {
            Some(pipeline) => pipeline.push(bytes, &mut encoded)?,
            None => encoded.extend_from_slice(bytes),
        }
        self.write_framed(&encoded);
        Ok(())
    }

    fn write_framed(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.chunked {
            self.buf
                .extend_from_slice(format!("{:x}\r\n", bytes.len()).as_bytes());
            self.buf.extend_from_slice(bytes);
            self.buf.extend_from_slice(b"\r\n");
        } else {
            self.buf.extend_from_slice(bytes);
        }
    }

    /// Flush any buffered encoder state and, if chunked, emit the
    /// terminating zero-size chunk. Consumes the serializer and returns
    /// the completed message.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Codec`] if a configured encoder fails to
    /// flush.
    pub fn finish(mut self) -> Result<Vec<u8>, ParseError> {
        if let Some(pipeline) = self.encoder.take() {
            let mut tail = Vec::new();
            pipeline.finish(&mut tail)?;
            self.write_framed(&tail);
        }
        if self.chunked {
            self.buf.extend_from_slice(b"0\r\n\r\n");
        }
        Ok(self.buf)
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    #[test]
    fn identity_request_round_trips_through_header_block() {
        let mut ser = Serializer::new();
        ser.write_request_line(&HttpMethod::GET, "/hello", HttpVersion::Http11);
        ser.write_header(&Header::new("Host", "example.com"));
        ser.finish_headers();
        let out = ser.finish().unwrap();
        assert_eq!(
            out,
            b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn chunked_body_is_framed_with_size_prefixes() {
        let mut ser = Serializer::new();
        ser.write_status_line(&StatusCode::new(200, "OK"), HttpVersion::Http11);
        ser.enable_chunked();
        ser.write_header(&Header::new("Transfer-Encoding", "chunked"));
        ser.finish_headers();
        ser.write_body(b"hello").unwrap();
        let out = ser.finish().unwrap();
        assert!(out.ends_with(b"5\r\nhello\r\n0\r\n\r\n"));
    }

    #[test]
    fn write_body_before_headers_finished_errors() {
        let mut ser = Serializer::new();
        assert!(ser.write_body(b"x").is_err());
    }
}
