use std::fs::File;
use std::io::Write;

use crate::parser::ParseError;

/// A polymorphic destination for decoded body bytes. Contract: `write`
/// must consume all of `bytes` unless it returns an error.
pub trait Sink: Send {
    /// Accept a chunk of decoded body bytes. `more` is `false` on the final
    /// call for this message.
    fn write(&mut self, bytes: &[u8], more: bool) -> Result<usize, ParseError>;
}

/// A growable in-memory buffer sink — the default when no sink is
/// installed via [`crate::parser::RequestParser::set_body`].
#[derive(Debug, Default)]
pub struct DynBufSink {
    buf: Vec<u8>,
}

impl DynBufSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Sink for DynBufSink {
    fn write(&mut self, bytes: &[u8], _more: bool) -> Result<usize, ParseError> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}

/// Writes decoded body bytes straight to a file, for large payloads that
/// shouldn't be held in memory.
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl Sink for FileSink {
    fn write(&mut self, bytes: &[u8], _more: bool) -> Result<usize, ParseError> {
        self.file
            .write_all(bytes)
            .map_err(|e| ParseError::Codec(format!("file sink write failed: {e}")))?;
        Ok(bytes.len())
    }
}

/// The variant sink held by a parser: a dynamic buffer by default, or a
/// user-installed sink after `set_body`.
pub enum BodySink {
    DynBuf(DynBufSink),
    File(FileSink),
    User(Box<dyn Sink>),
}

impl Default for BodySink {
    fn default() -> Self {
        Self::DynBuf(DynBufSink::new())
    }
}

impl BodySink {
    pub(crate) fn write(&mut self, bytes: &[u8], more: bool) -> Result<usize, ParseError> {
        match self {
            Self::DynBuf(s) => s.write(bytes, more),
            Self::File(s) => s.write(bytes, more),
            Self::User(s) => s.write(bytes, more),
        }
    }

    /// `true` if this is still the default in-memory sink (i.e.
    /// `set_body` has not been called) — used by `pull_body`/`consume_body`
    /// bookkeeping, which only applies to the default sink.
    pub(crate) fn is_default_dyn_buf(&self) -> bool {
        matches!(self, Self::DynBuf(_))
    }

    pub(crate) fn as_dyn_buf(&self) -> Option<&DynBufSink> {
        match self {
            Self::DynBuf(s) => Some(s),
            _ => None,
        }
    }
}
