use crate::types::Header;

/// Which content-codings an installed [`HeaderView`] declares, in the
/// order they appear in `Content-Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coding {
    Gzip,
    Deflate,
    Br,
}

impl Coding {
    fn from_token(tok: &str) -> Option<Self> {
        match tok.trim().to_ascii_lowercase().as_str() {
            "gzip" | "x-gzip" => Some(Self::Gzip),
            "deflate" => Some(Self::Deflate),
            "br" => Some(Self::Br),
            _ => None,
        }
    }
}

/// A parsed, immutable view over a message's headers.
///
/// Valid only while [`crate::parser::RequestParser::got_header`] /
/// [`crate::parser::ResponseParser::got_header`] is `true`, and until the
/// next `start`/`reset`.
#[derive(Debug, Clone, Default)]
pub struct HeaderView {
    pub(crate) headers: Vec<Header>,
    /// Trailers observed after a chunked body's terminating zero-size
    /// chunk. Appended here if they fit within the header limits,
    /// discarded silently otherwise.
    pub(crate) trailers: Vec<Header>,
    pub(crate) has_content_length: bool,
    pub(crate) has_chunked: bool,
    pub(crate) has_connection_close: bool,
    pub(crate) has_upgrade: bool,
    pub(crate) content_codings: Vec<Coding>,
}

impl HeaderView {
    /// All header fields, in wire order (duplicates kept, not merged —
    /// semantic merging of repeated fields is the consumer's concern).
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Trailer fields observed after a chunked body, if any.
    pub fn trailers(&self) -> &[Header] {
        &self.trailers
    }

    /// First header value matching `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// All header values matching `name`, case-insensitively, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn has_content_length(&self) -> bool {
        self.has_content_length
    }

    pub fn has_chunked_transfer_encoding(&self) -> bool {
        self.has_chunked
    }

    pub fn has_connection_close(&self) -> bool {
        self.has_connection_close
    }

    pub fn has_upgrade(&self) -> bool {
        self.has_upgrade
    }

    /// The content-codings declared by `Content-Encoding`, left-to-right
    /// as written (the codec pipeline applies them right-to-left when
    /// decoding, since the outermost-listed coding was applied last).
    pub fn content_codings(&self) -> &[Coding] {
        &self.content_codings
    }

    pub(crate) fn push(&mut self, header: Header) {
        if header.name.eq_ignore_ascii_case("transfer-encoding")
            && header.value.to_ascii_lowercase().contains("chunked")
        {
            self.has_chunked = true;
        }
        if header.name.eq_ignore_ascii_case("content-length") {
            self.has_content_length = true;
        }
        if header.name.eq_ignore_ascii_case("connection")
            && header.value.to_ascii_lowercase().contains("close")
        {
            self.has_connection_close = true;
        }
        if header.name.eq_ignore_ascii_case("upgrade") {
            self.has_upgrade = true;
        }
        if header.name.eq_ignore_ascii_case("content-encoding") {
            for tok in header.value.split(',') {
                if let Some(c) = Coding::from_token(tok) {
                    self.content_codings.push(c);
                }
            }
        }
        self.headers.push(header);
    }

    pub(crate) fn push_trailer(&mut self, header: Header) {
        self.trailers.push(header);
    }

    pub(crate) fn clear(&mut self) {
        self.headers.clear();
        self.trailers.clear();
        self.has_content_length = false;
        self.has_chunked = false;
        self.has_connection_close = false;
        self.has_upgrade = false;
        self.content_codings.clear();
    }
}
