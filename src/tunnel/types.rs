use crate::error::TunnelError;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

/// Port used when the request URL does not name one.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Ordered header list; order is preserved on the wire.
pub type Headers = Vec<(String, String)>;

/// Tunnel target derived from a request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// `host:port` as written in the CONNECT request line.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Address of the local forward proxy. Always loopback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    pub host: String,
    pub port: u16,
}

impl ProxyAddress {
    pub fn loopback(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
        }
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// HTTP method of the tunneled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = TunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(TunnelError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to send through the tunnel.
#[derive(Debug, Clone)]
pub struct TunnelRequest {
    pub method: HttpMethod,
    pub endpoint: Endpoint,
    /// Path plus `?query`, never empty.
    pub path: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl TunnelRequest {
    /// Builds a request from an `http://` URL.
    ///
    /// TLS is not terminated by the client, so other schemes are rejected.
    pub fn from_url(
        method: HttpMethod,
        url: &str,
        headers: Headers,
        body: Option<String>,
    ) -> Result<Self, TunnelError> {
        let parsed_url =
            url::Url::parse(url).map_err(|e| TunnelError::InvalidUrl(format!("{url}: {e}")))?;

        if parsed_url.scheme() != "http" {
            return Err(TunnelError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed_url.scheme()
            )));
        }

        let host = match parsed_url.host_str() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(TunnelError::InvalidUrl("URL has no host".to_string())),
        };

        let port = parsed_url.port().unwrap_or(DEFAULT_HTTP_PORT);
        let path = match parsed_url.query() {
            Some(query) => format!("{}?{}", parsed_url.path(), query),
            None => parsed_url.path().to_string(),
        };
        let path = if path.is_empty() || path.starts_with('?') {
            format!("/{path}")
        } else {
            path
        };

        Ok(Self {
            method,
            endpoint: Endpoint { host, port },
            path,
            headers,
            body,
        })
    }
}

/// Parsed application response.
///
/// Both body views are computed once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelResponse {
    pub status_code: u16,
    pub body_text: String,
    pub body_bytes: Vec<u8>,
    /// Always empty; only the status line is parsed.
    pub headers: HashMap<String, String>,
    /// Loosely decoded header block, status line included.
    pub header_block: String,
}

/// Incoming tunnel request from an API client
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    /// Read idle timeout in milliseconds
    pub timeout: Option<u64>,
}

/// Phase timing of one exchange, in milliseconds
#[derive(Debug, Clone, Serialize, Default)]
pub struct TimingInfo {
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handshake: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub header_block: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_base64: Option<String>,
    pub is_binary: bool,
    pub size: usize,
    pub timing: TimingInfo,
    pub url: String,
}

/// Successful API reply; failures are rendered by `AppError`.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyResponse {
    pub success: bool,
    pub data: ResponseData,
}

impl ProxyResponse {
    pub fn success(data: ResponseData) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
