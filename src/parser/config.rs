use crate::parser::ParseError;
use crate::service::ServiceContainer;

/// Configurable limits and feature flags for the HTTP parser.
///
/// All sizes are in bytes unless stated otherwise. Built once and shared
/// (read-only) by arbitrarily many
/// [`crate::parser::RequestParser`]/[`crate::parser::ResponseParser`]
/// instances.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Maximum length of the method token (default: 32).
    pub max_method_len: usize,
    /// Maximum length of the request-target / URI (default: 8 192).
    pub max_uri_len: usize,
    /// Maximum length of a single header field name (default: 256).
    pub max_header_name_len: usize,
    /// Maximum length of a single header field value (default: 8 192).
    pub max_header_value_len: usize,
    /// Maximum number of header fields, including trailers (default: 128).
    pub max_headers_count: usize,
    /// Maximum total size of the header block, start line included
    /// (default: 64 KiB).
    pub max_total_header_bytes: usize,
    /// Maximum size of a fully *decoded* body (default: 10 MiB).
    pub body_limit: u64,
    /// Enable gzip `Content-Encoding` decoding. Requires a
    /// [`crate::parser::codec::GzipService`] installed in the
    /// [`ServiceContainer`] passed to [`ParserConfig::prepare`].
    pub apply_gzip_decoder: bool,
    /// Enable deflate `Content-Encoding` decoding. Requires a
    /// [`crate::parser::codec::DeflateService`].
    pub apply_deflate_decoder: bool,
    /// Enable brotli `Content-Encoding` decoding. Requires a
    /// [`crate::parser::codec::BrotliService`].
    pub apply_brotli_decoder: bool,
    /// Zlib window bits (9-15); must be >= the value used during
    /// compression.
    pub zlib_window_bits: u8,
    /// Minimum space reserved for payload buffering; cannot be zero.
    pub min_buffer: usize,
    /// Largest region handed back by `prepare()` in one call; cannot be
    /// zero.
    pub max_prepare: usize,
    /// Space reserved for type-erased body sink storage.
    pub max_type_erase: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_method_len: 32,
            max_uri_len: 8_192,
            max_header_name_len: 256,
            max_header_value_len: 8_192,
            max_headers_count: 128,
            max_total_header_bytes: 64 * 1024,
            body_limit: 10 * 1024 * 1024,
            apply_gzip_decoder: false,
            apply_deflate_decoder: false,
            apply_brotli_decoder: false,
            zlib_window_bits: 15,
            min_buffer: 4096,
            max_prepare: 64 * 1024,
            max_type_erase: 1024,
        }
    }
}

/// A [`ParserConfig`] that has been validated and paired with resolved
/// codec services, ready to back one or more parsers.
///
/// An immutable, shareable handle produced once and cheap to clone
/// (`Arc`-backed) for every connection.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedConfig {
    pub(crate) config: ParserConfig,
    pub(crate) space_needed: usize,
}

impl ParserConfig {
    /// Validate this configuration against a service container and
    /// precompute the total workspace size it implies.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Precondition`] if `max_prepare` or
    /// `min_buffer` is zero, or if a codec flag is enabled without a
    /// matching service installed in `services`.
    pub fn prepare(self, services: &ServiceContainer) -> Result<PreparedConfig, ParseError> {
        if self.max_prepare == 0 {
            return Err(ParseError::Precondition("max_prepare must be non-zero"));
        }
        if self.min_buffer == 0 {
            return Err(ParseError::Precondition("min_buffer must be non-zero"));
        }

        if self.apply_gzip_decoder && !services.contains::<crate::parser::codec::GzipService>() {
            return Err(ParseError::Precondition(
                "apply_gzip_decoder set but no GzipService installed",
            ));
        }
        if self.apply_deflate_decoder
            && !services.contains::<crate::parser::codec::DeflateService>()
        {
            return Err(ParseError::Precondition(
                "apply_deflate_decoder set but no DeflateService installed",
            ));
        }
        if self.apply_brotli_decoder
            && !services.contains::<crate::parser::codec::BrotliService>()
        {
            return Err(ParseError::Precondition(
                "apply_brotli_decoder set but no BrotliService installed",
            ));
        }

        // Derived workspace size: header scratch + two I/O buffers + body
        // sink type-erasure reserve. Callers can use this figure to
        // pre-size connection pools.
        let mut space_needed = self.max_total_header_bytes;
        space_needed += self.min_buffer * 2;
        space_needed += self.max_type_erase;
        if self.apply_gzip_decoder || self.apply_deflate_decoder {
            space_needed += (1usize << self.zlib_window_bits) + 7 * 1024;
        }

        Ok(PreparedConfig {
            config: self,
            space_needed,
        })
    }
}

impl PreparedConfig {
    /// The precomputed total workspace size this configuration implies.
    pub fn space_needed(&self) -> usize {
        self.space_needed
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}
