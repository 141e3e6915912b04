//! Shared wire-format vocabulary used by both the parser and the serializer.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::parser::ParseError;

// ---------------------------------------------------------------------------
// HttpMethod
// ---------------------------------------------------------------------------

/// Standard HTTP request methods as defined in RFC 9110.
///
/// Unknown methods are accepted as a raw token rather than rejected
/// outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
    /// A method token that isn't one of the standard nine.
    Other(String),
}

impl HttpMethod {
    /// Parse an HTTP method from a byte slice.
    ///
    /// Never fails on a well-formed token; the caller's token-character
    /// validation during accumulation is what rejects malformed methods.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes {
            b"GET" => Self::GET,
            b"HEAD" => Self::HEAD,
            b"POST" => Self::POST,
            b"PUT" => Self::PUT,
            b"DELETE" => Self::DELETE,
            b"CONNECT" => Self::CONNECT,
            b"OPTIONS" => Self::OPTIONS,
            b"TRACE" => Self::TRACE,
            b"PATCH" => Self::PATCH,
            other => Self::Other(String::from_utf8_lossy(other).into_owned()),
        }
    }

    /// Return the method as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::DELETE => "DELETE",
            Self::CONNECT => "CONNECT",
            Self::OPTIONS => "OPTIONS",
            Self::TRACE => "TRACE",
            Self::PATCH => "PATCH",
            Self::Other(s) => s.as_str(),
        }
    }

    /// `true` for `HEAD` — used by the response framer to suppress a body
    /// regardless of `Content-Length`/`Transfer-Encoding`.
    pub fn is_head(&self) -> bool {
        matches!(self, Self::HEAD)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HttpVersion
// ---------------------------------------------------------------------------

/// HTTP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
}

impl HttpVersion {
    /// Parse an HTTP version from a byte slice (e.g. `b"HTTP/1.1"`).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        match bytes {
            b"HTTP/1.0" => Ok(Self::Http10),
            b"HTTP/1.1" => Ok(Self::Http11),
            _ => Err(ParseError::InvalidVersion(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
        }
    }

    /// Return the version as a static string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// A single HTTP header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Header field name (original casing preserved).
    pub name: String,
    /// Header field value (leading/trailing OWS trimmed).
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Status code (response start-line)
// ---------------------------------------------------------------------------

/// A three-digit HTTP status code plus reason phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCode {
    pub code: u16,
    pub reason: String,
}

impl StatusCode {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Status codes that forbid a message body regardless of framing
    /// headers.
    pub fn forbids_body(&self) -> bool {
        matches!(self.code, 100..=199 | 204 | 304)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}
