mod common;

use std::io::Write;

use wireframe_core::parser::codec::{install_all, GzipService};
use wireframe_core::parser::{ParserConfig, RequestParser};
use wireframe_core::service::ServiceContainer;
use wireframe_core::types::HttpMethod;

use common::{parse_request, parse_request_chunked, parse_response_chunked};

#[test]
fn parses_simple_get_request() {
    let services = ServiceContainer::new();
    let parser = parse_request(
        b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n",
        ParserConfig::default(),
        &services,
    );

    assert!(parser.got_header());
    assert!(parser.is_complete());
    assert_eq!(parser.method(), Some(&HttpMethod::GET));
    assert_eq!(parser.uri(), Some("/hello"));
    assert_eq!(parser.get().unwrap().get("host"), Some("example.com"));
    assert_eq!(parser.pull_body(), b"");
}

#[test]
fn unknown_method_is_preserved_as_raw_token() {
    let services = ServiceContainer::new();
    let parser = parse_request(
        b"PURGE /cache HTTP/1.1\r\nHost: a\r\n\r\n",
        ParserConfig::default(),
        &services,
    );
    match parser.method() {
        Some(HttpMethod::Other(s)) => assert_eq!(s, "PURGE"),
        other => panic!("expected Other(\"PURGE\"), got {other:?}"),
    }
}

#[test]
fn content_length_body_is_delivered_to_default_sink() {
    let services = ServiceContainer::new();
    let parser = parse_request(
        b"POST /x HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello",
        ParserConfig::default(),
        &services,
    );
    assert!(parser.is_complete());
    assert_eq!(parser.pull_body(), b"hello");
}

#[test]
fn chunked_request_roundtrip() {
    let services = ServiceContainer::new();
    let parser = parse_request(
        b"POST /x HTTP/1.1\r\nHost: a\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
        ParserConfig::default(),
        &services,
    );
    assert!(parser.got_header());
    assert_eq!(parser.method(), Some(&HttpMethod::POST));
    assert_eq!(parser.uri(), Some("/x"));
    assert_eq!(parser.pull_body(), b"hello");
    assert!(parser.is_complete());
}

/// Chunked transfer-encoding takes precedence over a conflicting
/// Content-Length when both framings are present.
#[test]
fn chunked_wins_over_conflicting_content_length() {
    let services = ServiceContainer::new();
    let parser = parse_request(
        b"POST /x HTTP/1.1\r\nHost: a\r\nContent-Length: 3\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
        ParserConfig::default(),
        &services,
    );
    assert!(parser.is_complete());
    assert_eq!(parser.pull_body(), b"hello");
}

#[test]
fn disagreeing_content_length_headers_are_rejected() {
    let services = ServiceContainer::new();
    let prepared = std::sync::Arc::new(ParserConfig::default().prepare(&services).unwrap());
    let mut parser = RequestParser::new(prepared);
    parser.start().unwrap();
    let data = b"POST /x HTTP/1.1\r\nHost: a\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd";
    let dst = parser.prepare();
    dst[..data.len()].copy_from_slice(data);
    parser.commit(data.len());
    parser.commit_eof();
    assert!(parser.parse().is_err());
}

/// Parsing the same bytes in arbitrary chunk sizes produces the same
/// final state and body.
#[test]
fn arbitrary_chunking_of_input_is_equivalent_to_one_shot() {
    let data = b"POST /x HTTP/1.1\r\nHost: a\r\nContent-Length: 11\r\n\r\nhello world";
    for chunk_size in [1, 2, 7, 1024] {
        let services = ServiceContainer::new();
        let parser = parse_request_chunked(data, ParserConfig::default(), &services, chunk_size);
        assert!(parser.is_complete(), "chunk_size={chunk_size}");
        assert_eq!(parser.pull_body(), b"hello world", "chunk_size={chunk_size}");
    }
}

#[test]
fn gzip_encoded_response_body_is_decoded() {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(b"abc").unwrap();
    let compressed = encoder.finish().unwrap();

    let mut services = ServiceContainer::new();
    services.install(GzipService::new());

    let mut data = b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: ".to_vec();
    data.extend_from_slice(compressed.len().to_string().as_bytes());
    data.extend_from_slice(b"\r\n\r\n");
    data.extend_from_slice(&compressed);

    let config = ParserConfig {
        apply_gzip_decoder: true,
        ..ParserConfig::default()
    };
    let parser = parse_response_chunked(&data, config, &services, data.len(), false);
    assert!(parser.is_complete());
    assert_eq!(parser.pull_body(), b"abc");
}

#[test]
fn codec_enabled_without_service_is_a_configuration_error() {
    let services = ServiceContainer::new();
    let config = ParserConfig {
        apply_gzip_decoder: true,
        ..ParserConfig::default()
    };
    assert!(config.prepare(&services).is_err());
}

#[test]
fn install_all_satisfies_every_codec_flag() {
    let mut services = ServiceContainer::new();
    install_all(&mut services);
    let config = ParserConfig {
        apply_gzip_decoder: true,
        apply_deflate_decoder: true,
        apply_brotli_decoder: true,
        ..ParserConfig::default()
    };
    assert!(config.prepare(&services).is_ok());
}

/// Status codes that forbid a body are honored regardless of framing
/// headers.
#[test]
fn no_content_status_has_no_body_even_with_content_length_header() {
    let services = ServiceContainer::new();
    let data = b"HTTP/1.1 204 No Content\r\nContent-Length: 5\r\n\r\n";
    let parser = parse_response_chunked(data, ParserConfig::default(), &services, data.len(), false);
    assert!(parser.is_complete());
    assert_eq!(parser.pull_body(), b"");
}

#[test]
fn head_response_override_suppresses_body() {
    let services = ServiceContainer::new();
    let data = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
    let parser = parse_response_chunked(data, ParserConfig::default(), &services, data.len(), true);
    assert!(parser.is_complete());
    assert_eq!(parser.pull_body(), b"");
}

#[test]
fn body_exceeding_limit_is_rejected() {
    let services = ServiceContainer::new();
    let config = ParserConfig {
        body_limit: 3,
        ..ParserConfig::default()
    };
    let prepared = std::sync::Arc::new(config.prepare(&services).unwrap());
    let mut parser = RequestParser::new(prepared);
    parser.start().unwrap();
    let data = b"POST /x HTTP/1.1\r\nHost: a\r\nContent-Length: 10\r\n\r\n0123456789";
    let dst = parser.prepare();
    dst[..data.len()].copy_from_slice(data);
    parser.commit(data.len());
    parser.commit_eof();
    assert!(parser.parse().is_err());
}

#[test]
fn trailers_are_appended_to_header_view() {
    let services = ServiceContainer::new();
    let data = b"POST /x HTTP/1.1\r\nHost: a\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\nX-Trailer: done\r\n\r\n";
    let parser = parse_request(data, ParserConfig::default(), &services);
    assert!(parser.is_complete());
    let view = parser.get().unwrap();
    assert_eq!(view.trailers().len(), 1);
    assert_eq!(view.trailers()[0].value, "done");
}

#[test]
fn response_without_content_length_or_chunking_reads_until_eof() {
    let services = ServiceContainer::new();
    let data = b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\nhello world";
    let parser = parse_response_chunked(data, ParserConfig::default(), &services, 4, false);
    assert!(parser.is_complete());
    assert_eq!(parser.pull_body(), b"hello world");
}
