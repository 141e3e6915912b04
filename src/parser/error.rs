use std::fmt;

/// Errors that can occur during HTTP message parsing.
///
/// All variants are input errors: malformed wire data or a limit breach.
/// They are terminal for the current message but never panic and never
/// poison the parser process-wide — the caller inspects the returned code
/// and decides whether to close the connection or reset and keep reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request method token exceeded `max_method_len`.
    InvalidMethod(String),
    /// The HTTP version string is not `HTTP/1.0` or `HTTP/1.1`.
    InvalidVersion(String),
    /// The request URI is malformed or empty.
    InvalidUri(String),
    /// The status code is not three decimal digits.
    InvalidStatusCode(String),
    /// The `Content-Length` header value is not a valid integer, or
    /// multiple `Content-Length` headers disagree (RFC 9112 §6.3).
    InvalidContentLength(String),
    /// A chunk size in chunked transfer encoding is not valid hexadecimal.
    InvalidChunkSize(String),
    /// An unexpected byte was encountered during parsing.
    UnexpectedByte {
        /// Human-readable description of what was expected.
        expected: &'static str,
        /// The actual byte value found.
        found: u8,
    },
    /// A header name or value exceeds the configured maximum size, or the
    /// total header block exceeds `max_total_header_bytes`.
    HeaderTooLarge,
    /// The decoded request/response body exceeds `body_limit`.
    BodyTooLarge,
    /// The number of headers exceeds `max_headers_count`.
    TooManyHeaders,
    /// The message ended before a complete start line + header block was
    /// parsed.
    IncompleteMessage,
    /// A content-encoding was present in the header but no matching codec
    /// service was enabled/installed.
    UnsupportedContentEncoding(String),
    /// The installed codec reported a decode failure; propagated verbatim.
    Codec(String),
    /// A precondition was violated by the caller (e.g. `set_body` called
    /// before `got_header()`, or `start()` called on an unfinished
    /// message). This is a programmer error; it is still returned as a
    /// `Result` here rather than panicking, since a panicking library API
    /// is not idiomatic for a parsing core embedded in a server.
    Precondition(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMethod(m) => write!(f, "invalid HTTP method: '{m}'"),
            Self::InvalidVersion(v) => write!(f, "invalid HTTP version: '{v}'"),
            Self::InvalidUri(u) => write!(f, "invalid request URI: '{u}'"),
            Self::InvalidStatusCode(s) => write!(f, "invalid status code: '{s}'"),
            Self::InvalidContentLength(v) => write!(f, "invalid Content-Length: '{v}'"),
            Self::InvalidChunkSize(s) => write!(f, "invalid chunk size: '{s}'"),
            Self::UnexpectedByte { expected, found } => {
                write!(f, "unexpected byte 0x{found:02X} (expected {expected})")
            }
            Self::HeaderTooLarge => write!(f, "header block exceeds maximum allowed size"),
            Self::BodyTooLarge => write!(f, "body exceeds maximum allowed size"),
            Self::TooManyHeaders => write!(f, "number of headers exceeds maximum"),
            Self::IncompleteMessage => write!(f, "incomplete HTTP message"),
            Self::UnsupportedContentEncoding(e) => {
                write!(f, "content-encoding '{e}' has no enabled/installed codec")
            }
            Self::Codec(e) => write!(f, "codec error: {e}"),
            Self::Precondition(msg) => write!(f, "precondition violated: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Numeric error category for `(category, code)` round-tripping.
///
/// The parser subsystem's codes never collide with the router's or
/// bcrypt's, since each subsystem owns a disjoint `Category`.
pub const CATEGORY: &str = "wireframe.parser";

impl ParseError {
    /// A stable integer code for this error variant, unique within the
    /// parser category.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidMethod(_) => 1,
            Self::InvalidVersion(_) => 2,
            Self::InvalidUri(_) => 3,
            Self::InvalidStatusCode(_) => 4,
            Self::InvalidContentLength(_) => 5,
            Self::InvalidChunkSize(_) => 6,
            Self::UnexpectedByte { .. } => 7,
            Self::HeaderTooLarge => 8,
            Self::BodyTooLarge => 9,
            Self::TooManyHeaders => 10,
            Self::IncompleteMessage => 11,
            Self::UnsupportedContentEncoding(_) => 12,
            Self::Codec(_) => 13,
            Self::Precondition(_) => 14,
        }
    }
}
