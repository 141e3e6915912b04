//! Content-encoding pipeline for the serializer, the write-side mirror of
//! [`crate::parser::codec`]. Built left-to-right in the order codings are
//! listed: the encode order *is* the `Content-Encoding` order, and the
//! parser reverses that order to decode.

use std::io::Write;

use crate::parser::header::Coding;
use crate::parser::ParseError;

fn codec_err(e: impl std::fmt::Display) -> ParseError {
    ParseError::Codec(e.to_string())
}

pub(crate) trait Encoder: Send {
    fn push(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), ParseError>;
    fn finish(self: Box<Self>, out: &mut Vec<u8>) -> Result<(), ParseError>;
}

struct GzipEncoder {
    inner: flate2::write::GzEncoder<Vec<u8>>,
}
impl GzipEncoder {
    fn new() -> Self {
        Self {
            inner: flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default()),
        }
    }
}
impl Encoder for GzipEncoder {
    fn push(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), ParseError> {
        self.inner.write_all(input).map_err(codec_err)?;
        out.append(self.inner.get_mut());
        Ok(())
    }
    fn finish(self: Box<Self>, out: &mut Vec<u8>) -> Result<(), ParseError> {
        let remaining = self.inner.finish().map_err(codec_err)?;
        out.extend_from_slice(&remaining);
        Ok(())
    }
}

struct DeflateEncoder {
    inner: flate2::write::ZlibEncoder<Vec<u8>>,
}
impl DeflateEncoder {
    fn new() -> Self {
        Self {
            inner: flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default()),
        }
    }
}
impl Encoder for DeflateEncoder {
    fn push(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), ParseError> {
        self.inner.write_all(input).map_err(codec_err)?;
        out.append(self.inner.get_mut());
        Ok(())
    }
    fn finish(self: Box<Self>, out: &mut Vec<u8>) -> Result<(), ParseError> {
        let remaining = self.inner.finish().map_err(codec_err)?;
        out.extend_from_slice(&remaining);
        Ok(())
    }
}

struct BrotliEncoder {
    inner: brotli::CompressorWriter<Vec<u8>>,
}
impl BrotliEncoder {
    fn new() -> Self {
        Self {
            inner: brotli::CompressorWriter::new(Vec::new(), 4096, 5, 22),
        }
    }
}
impl Encoder for BrotliEncoder {
    fn push(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), ParseError> {
        self.inner.write_all(input).map_err(codec_err)?;
        out.append(self.inner.get_mut());
        Ok(())
    }
    fn finish(mut self: Box<Self>, out: &mut Vec<u8>) -> Result<(), ParseError> {
        self.inner.flush().map_err(codec_err)?;
        out.append(self.inner.get_mut());
        Ok(())
    }
}

/// A chain of encoders applied in `Content-Encoding` order.
pub(crate) struct EncodePipeline {
    stages: Vec<Box<dyn Encoder>>,
    scratch: Vec<u8>,
}

impl EncodePipeline {
    pub(crate) fn new(codings: &[Coding]) -> Self {
        let stages = codings
            .iter()
            .map(|c| -> Box<dyn Encoder> {
                match c {
                    Coding::Gzip => Box::new(GzipEncoder::new()),
                    Coding::Deflate => Box::new(DeflateEncoder::new()),
                    Coding::Br => Box::new(BrotliEncoder::new()),
                }
            })
            .collect();
        Self {
            stages,
            scratch: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), ParseError> {
        if self.stages.is_empty() {
            out.extend_from_slice(input);
            return Ok(());
        }
        let mut current: &[u8] = input;
        let n = self.stages.len();
        for (i, stage) in self.stages.iter_mut().enumerate() {
            let target = if i + 1 == n {
                &mut *out
            } else {
                self.scratch.clear();
                &mut self.scratch
            };
            stage.push(current, target)?;
            if i + 1 != n {
                current = &self.scratch;
            }
        }
        Ok(())
    }

    pub(crate) fn finish(mut self, out: &mut Vec<u8>) -> Result<(), ParseError> {
        if self.stages.is_empty() {
            return Ok(());
        }
        let n = self.stages.len();
        for (i, stage) in self.stages.drain(..).enumerate() {
            if i + 1 == n {
                stage.finish(out)?;
            } else {
                let mut tail = Vec::new();
                stage.finish(&mut tail)?;
                out.extend_from_slice(&tail);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_encode_then_parser_decode_roundtrips() {
        let mut pipeline = EncodePipeline::new(&[Coding::Gzip]);
        let mut encoded = Vec::new();
        pipeline.push(b"hello, world", &mut encoded).unwrap();
        pipeline.finish(&mut encoded).unwrap();

        let mut decode = crate::parser::CodecPipeline::new(&[Coding::Gzip]);
        let mut decoded = Vec::new();
        decode.push(&encoded, &mut decoded).unwrap();
        decode.finish(&mut decoded).unwrap();
        assert_eq!(decoded, b"hello, world");
    }
}
