//! Response building utilities for the HTTP API.
//!
//! Converts a parsed `TunnelResponse` into the serializable `ProxyResponse`,
//! choosing between a text body and a base64 body.

use super::types::{ProxyResponse, ResponseData, TunnelResponse};
use crate::shared::{status_text, DetailedTiming};
use base64::Engine;

/// Whether the body must be shipped as base64.
///
/// Headers are not parsed, so the decision rests on the bytes alone: a body
/// that is not valid UTF-8 would be altered by the lossy text view.
pub fn is_binary_body(body: &[u8]) -> bool {
    std::str::from_utf8(body).is_err()
}

/// Builds a successful `ProxyResponse` from a parsed tunnel response.
pub fn build_response(
    response: TunnelResponse,
    timing: DetailedTiming,
    url: String,
) -> ProxyResponse {
    let TunnelResponse {
        status_code,
        body_text,
        body_bytes,
        headers,
        header_block,
    } = response;

    let is_binary = is_binary_body(&body_bytes);
    let (body, body_base64) = if is_binary {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&body_bytes);
        (String::new(), Some(b64))
    } else {
        (body_text, None)
    };

    ProxyResponse::success(ResponseData {
        status: status_code,
        status_text: status_text(status_code),
        headers,
        header_block,
        body,
        body_base64,
        is_binary,
        size: body_bytes.len(),
        timing: timing.to_timing_info(),
        url,
    })
}
