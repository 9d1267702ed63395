use bytes::Bytes;

use crate::http::request::{Method, ParsedRequest};

/// Parses the request line out of a single bounded read.
///
/// Only the first line is looked at; headers and body stay in `raw`. A line
/// that does not split into exactly three whitespace-separated tokens yields
/// [`ParsedRequest::malformed`]. This never fails.
pub fn parse_request_line(buf: &[u8]) -> ParsedRequest {
    let raw = Bytes::copy_from_slice(buf);

    let line = first_line(buf);
    let line = String::from_utf8_lossy(line);

    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
    match tokens.as_slice() {
        [method, path, version] => {
            ParsedRequest::new(Method::from_token(method), *path, *version, raw)
        }
        _ => ParsedRequest::malformed(raw),
    }
}

fn first_line(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == b'\n').unwrap_or(buf.len());
    let line = &buf[..end];
    line.strip_suffix(b"\r").unwrap_or(line)
}
