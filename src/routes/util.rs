//! Shared form/query parsing and error rendering for route handlers.

use crate::error::EngineError;
use crate::game::slots::SlotId;

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format (HTMX POST bodies and query strings).
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, val) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(val))
        })
        .collect()
}

/// Percent-decode a URL-encoded value. Multi-byte UTF-8 sequences are
/// reassembled; malformed escapes pass through untouched.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match hex_pair(bytes[i + 1], bytes[i + 2]) {
                    Some(v) => {
                        out.push(v);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Read the `slot` parameter.
pub fn slot_param(params: &[(String, String)]) -> Result<SlotId, String> {
    match get_param(params, "slot") {
        None | Some("") => Err(error_span("Missing slot parameter")),
        Some(s) => s
            .parse::<u32>()
            .map(SlotId)
            .map_err(|_| error_span("Invalid slot parameter")),
    }
}

/// Inline error fragment, swapped in where the requested content would go.
pub fn error_span(message: &str) -> String {
    format!(
        r#"<span class="text-pp-red">{}</span>"#,
        escape_html(message)
    )
}

pub fn engine_error(err: &EngineError) -> String {
    error_span(&err.to_string())
}

/// Minimal HTML escaping for user-controlled text (pet names).
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
