//! Incremental HTTP/1 parsing.
//!
//! [`RequestParser`] and [`ResponseParser`] are thin role-specific façades
//! over a shared [`engine::Engine`] FSM. Both expose the same incremental
//! contract: `prepare()` hands back a scratch region to fill with wire
//! bytes, `commit(n)` tells the engine how many of those bytes are valid,
//! and `parse()` drives the state machine until it needs more input or
//! reaches the end of the message.

pub mod body;
pub mod codec;
mod config;
mod engine;
mod error;
pub mod header;
mod request;
mod response;

pub use body::{BodySink, DynBufSink, FileSink, Sink};
pub use codec::CodecPipeline;
pub use config::{ParserConfig, PreparedConfig};
pub use engine::ParseOutcome;
pub use error::{ParseError, CATEGORY};
pub use header::{Coding, HeaderView};
pub use request::RequestParser;
pub use response::ResponseParser;
