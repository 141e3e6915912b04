//! # wireframe-core
//!
//! An HTTP/1 protocol toolkit built around three largely independent
//! subsystems sharing only a configuration/service-container abstraction:
//!
//! - [`parser`] — an incremental, streaming HTTP/1.0/1.1 message decoder
//!   with a pluggable content-decoding pipeline and body sink.
//! - [`router`] — pattern-matched request dispatch through coroutine-style
//!   handlers, with an immutable compiled [`router::FlatRouter`] form for
//!   the hot path.
//! - [`bcrypt`] — salt generation, hashing, and constant-time comparison
//!   against the `$2a$`/`$2b$` password hash format.
//!
//! [`serializer`] is the write-side mirror of `parser`, and [`service`]
//! is the type-keyed store the parser's codec services and the router's
//! per-request data bag both build on.
//!
//! ## Quick start — parsing a request
//!
//! ```rust
//! use std::sync::Arc;
//! use wireframe_core::parser::{ParserConfig, RequestParser};
//! use wireframe_core::service::ServiceContainer;
//!
//! let services = ServiceContainer::new();
//! let config = Arc::new(ParserConfig::default().prepare(&services).unwrap());
//! let mut parser = RequestParser::new(config);
//! parser.start().unwrap();
//!
//! let input = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let dst = parser.prepare();
//! dst[..input.len()].copy_from_slice(input);
//! parser.commit(input.len());
//!
//! parser.parse().unwrap();
//! assert!(parser.is_complete());
//! assert_eq!(parser.uri(), Some("/hello"));
//! ```

pub mod bcrypt;
pub mod output;
pub mod parser;
pub mod router;
pub mod serializer;
pub mod service;
pub mod types;
