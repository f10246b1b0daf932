//! CONNECT negotiation with the local forward proxy.
//!
//! Only byte-level scanning is used to detect the end of the proxy reply and
//! its success marker, so a multi-byte sequence split across reads can never
//! confuse boundary detection.

use super::parser::{find_header_end, HEADER_TERMINATOR};
use super::types::Endpoint;

const TERMINATOR_LEN: usize = HEADER_TERMINATOR.len();

/// Status marker the proxy must send before the blank line.
const SUCCESS_MARKER: &[u8] = b" 200 ";

/// Serializes the CONNECT request for `endpoint`.
pub fn connect_request(endpoint: &Endpoint) -> String {
    let authority = endpoint.authority();
    format!("CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\n\r\n")
}

/// Result of inspecting the bytes received from the proxy so far.
#[derive(Debug, PartialEq, Eq)]
pub enum HandshakeStatus {
    /// No blank-line terminator seen yet.
    Incomplete,
    /// Tunnel is open; application bytes begin at `body_offset`.
    Established { body_offset: usize },
    /// Proxy refused; carries the loosely decoded reply head.
    Rejected(String),
}

/// Classifies the accumulated proxy reply.
///
/// `scanned` is how many leading bytes an earlier call already searched
/// without finding the terminator. The search resumes a few bytes before
/// that point so a terminator split across reads is still found, keeping
/// the total scan linear in the reply length.
pub fn classify(received: &[u8], scanned: usize) -> HandshakeStatus {
    let from = scanned
        .min(received.len())
        .saturating_sub(TERMINATOR_LEN - 1);
    let Some(end) = find_header_end(&received[from..]).map(|i| i + from) else {
        return HandshakeStatus::Incomplete;
    };

    let head = &received[..end];
    if contains(head, SUCCESS_MARKER) {
        HandshakeStatus::Established {
            body_offset: end + TERMINATOR_LEN,
        }
    } else {
        HandshakeStatus::Rejected(String::from_utf8_lossy(head).into_owned())
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
