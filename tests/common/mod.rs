use std::sync::Arc;

use wireframe_core::parser::{ParseOutcome, ParserConfig, RequestParser, ResponseParser};
use wireframe_core::service::ServiceContainer;

/// Feed `data` into a fresh [`RequestParser`] built against `config` and
/// `services`, split into `chunk_size`-byte pieces to verify the parser
/// is agnostic to how input is chunked, then mark EOF. Returns the
/// parser once it reports `end_of_message`.
pub fn parse_request_chunked(
    data: &[u8],
    config: ParserConfig,
    services: &ServiceContainer,
    chunk_size: usize,
) -> RequestParser {
    let prepared = Arc::new(config.prepare(services).expect("valid config"));
    let mut parser = RequestParser::new(prepared);
    parser.start().expect("start");

    let mut offset = 0;
    loop {
        let dst = parser.prepare();
        let remaining = data.len() - offset;
        let n = remaining.min(chunk_size).min(dst.len());
        dst[..n].copy_from_slice(&data[offset..offset + n]);
        parser.commit(n);
        offset += n;
        if offset == data.len() {
            parser.commit_eof();
        }

        match parser.parse().expect("parse") {
            ParseOutcome::EndOfMessage => break,
            ParseOutcome::NeedMoreInput => {
                if offset == data.len() {
                    panic!("parser never completed despite EOF");
                }
            }
        }
    }
    parser
}

pub fn parse_request(data: &[u8], config: ParserConfig, services: &ServiceContainer) -> RequestParser {
    parse_request_chunked(data, config, services, data.len().max(1))
}

pub fn parse_response_chunked(
    data: &[u8],
    config: ParserConfig,
    services: &ServiceContainer,
    chunk_size: usize,
    head_request: bool,
) -> ResponseParser {
    let prepared = Arc::new(config.prepare(services).expect("valid config"));
    let mut parser = ResponseParser::new(prepared);
    parser.start().expect("start");
    if head_request {
        parser.start_head_response();
    }

    let mut offset = 0;
    loop {
        let dst = parser.prepare();
        let remaining = data.len() - offset;
        let n = remaining.min(chunk_size).min(dst.len());
        dst[..n].copy_from_slice(&data[offset..offset + n]);
        parser.commit(n);
        offset += n;
        if offset == data.len() {
            parser.commit_eof();
        }

        match parser.parse().expect("parse") {
            ParseOutcome::EndOfMessage => break,
            ParseOutcome::NeedMoreInput => {
                if offset == data.len() {
                    panic!("parser never completed despite EOF");
                }
            }
        }
    }
    parser
}
