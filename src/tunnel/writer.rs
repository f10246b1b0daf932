//! Serialization of the tunneled HTTP/1.1 request.

use super::types::TunnelRequest;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Builds the request line and header block, blank line included.
///
/// `Content-Length` is always derived from the body; a caller-supplied one
/// is dropped.
pub fn request_head(request: &TunnelRequest) -> String {
    let mut head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nAccept-Encoding: identity\r\n",
        request.method.as_str(),
        request.path,
        request.endpoint.host
    );

    for (name, value) in &request.headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }

    if let Some(body) = &request.body {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        let has_content_type = request
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            head.push_str(&format!("Content-Type: {DEFAULT_CONTENT_TYPE}\r\n"));
        }
    }

    head.push_str("\r\n");
    head
}

/// Writes the head, then the body as a separate write, then flushes.
pub async fn write_request<W>(stream: &mut W, request: &TunnelRequest) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(request_head(request).as_bytes()).await?;
    if let Some(body) = &request.body {
        stream.write_all(body.as_bytes()).await?;
    }
    stream.flush().await
}
