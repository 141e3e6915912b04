//! CLI rendering helpers: render a parsed request as JSON, a
//! human-readable debug dump, or just its request line and headers.

use serde_json::json;

use crate::parser::RequestParser;

/// Serialize a fully parsed request to a JSON string.
pub fn format_json(parser: &RequestParser, body: &[u8], pretty: bool) -> String {
    let headers: Vec<_> = parser
        .get()
        .map(|h| h.headers())
        .unwrap_or_default()
        .iter()
        .map(|h| json!({"name": h.name, "value": h.value}))
        .collect();

    let value = json!({
        "method": parser.method().map(|m| m.as_str()),
        "uri": parser.uri(),
        "version": parser.version().map(|v| v.as_str()),
        "headers": headers,
        "body": String::from_utf8(body.to_vec()).ok(),
        "body_len": body.len(),
    });

    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Render a parsed request in a human-readable debug format.
pub fn format_debug(parser: &RequestParser, body: &[u8]) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("=== HTTP Request ===\n");
    out.push_str(&format!(
        "Method:  {}\n",
        parser.method().map(|m| m.as_str()).unwrap_or("?")
    ));
    out.push_str(&format!("URI:     {}\n", parser.uri().unwrap_or("?")));
    out.push_str(&format!(
        "Version: {}\n",
        parser
            .version()
            .map(|v| v.as_str())
            .unwrap_or("?")
    ));

    let headers = parser.get().map(|h| h.headers()).unwrap_or_default();
    out.push_str(&format!("\n--- Headers ({}) ---\n", headers.len()));
    for header in headers {
        out.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    if body.is_empty() {
        out.push_str("\n--- No Body ---\n");
    } else {
        out.push_str(&format!("\n--- Body ({} bytes) ---\n", body.len()));
        match std::str::from_utf8(body) {
            Ok(s) => out.push_str(s),
            Err(_) => out.push_str(&format!("<binary data: {} bytes>", body.len())),
        }
        out.push('\n');
    }

    out.push_str("====================\n");
    out
}

/// Render only the request line and headers (no body).
pub fn format_headers_only(parser: &RequestParser) -> String {
    let headers = parser.get().map(|h| h.headers()).unwrap_or_default();
    let mut out = String::with_capacity(64 + headers.len() * 40);

    out.push_str(&format!(
        "{} {} {}\n",
        parser.method().map(|m| m.as_str()).unwrap_or("?"),
        parser.uri().unwrap_or("?"),
        parser.version().map(|v| v.as_str()).unwrap_or("?")
    ));

    for header in headers {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }

    out
}
