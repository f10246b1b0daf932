//! Parsing of a fully accumulated HTTP response.
//!
//! The peer signals the end of the body by closing the connection, so the
//! parser always sees the whole exchange at once. Malformed input is
//! represented as a response rather than an error.

use super::types::TunnelResponse;
use std::collections::HashMap;

/// Blank line separating headers from the body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Status reported when no header boundary exists.
pub const MALFORMED_STATUS: u16 = 500;

/// Index of the first `\r\n\r\n` in `bytes`.
pub fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Parses the bytes received after the tunnel was established.
pub fn parse_response(bytes: Vec<u8>) -> TunnelResponse {
    let Some(end) = find_header_end(&bytes) else {
        return TunnelResponse {
            status_code: MALFORMED_STATUS,
            body_text: String::from_utf8_lossy(&bytes).into_owned(),
            body_bytes: bytes,
            headers: HashMap::new(),
            header_block: String::new(),
        };
    };

    let header_block = String::from_utf8_lossy(&bytes[..end]).into_owned();
    let status_code = parse_status_code(&header_block);

    let mut body_bytes = bytes;
    body_bytes.drain(..end + HEADER_TERMINATOR.len());

    TunnelResponse {
        status_code,
        body_text: String::from_utf8_lossy(&body_bytes).into_owned(),
        body_bytes,
        headers: HashMap::new(),
        header_block,
    }
}

/// Second space-separated token of the status line, or 0.
fn parse_status_code(header_block: &str) -> u16 {
    header_block
        .lines()
        .next()
        .and_then(|line| line.split(' ').nth(1))
        .and_then(|code| code.trim().parse().ok())
        .unwrap_or(0)
}
