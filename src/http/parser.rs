use crate::http::request::{Method, Request};
use std::collections::HashMap;

/// Slack allowed for the request line and headers on top of the body ceiling.
pub const HEADER_ALLOWANCE: usize = 8192;

#[derive(Debug)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    /// The declared body size exceeds the configured ceiling.
    BodyTooLarge { limit: usize },
    Incomplete,
}

/// Parses one HTTP/1.1 request out of `buf`.
///
/// Returns the request and the number of bytes consumed, so the caller can
/// drain its buffer and keep any pipelined follow-up request. `body_limit`
/// is enforced against the declared Content-Length before the body has
/// arrived, so an oversized request fails as soon as its headers are read.
pub fn parse_http_request(buf: &[u8], body_limit: usize) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(pos) => pos,
        None => {
            // Refuse unbounded header growth while waiting for the separator.
            if buf.len() > body_limit + HEADER_ALLOWANCE {
                return Err(ParseError::BodyTooLarge { limit: body_limit });
            }
            return Err(ParseError::Incomplete);
        }
    };
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest);
    let mut parts = request_line?.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;

        headers.insert(key.trim().to_string(), value.trim().to_string());
    }

    // Body. Header names are case-insensitive on the wire.
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, v)| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(0);

    if content_length > body_limit {
        return Err(ParseError::BodyTooLarge { limit: body_limit });
    }

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
