//! Byte-stream transport to the local proxy.
//!
//! Provides a trait-based abstraction over connection establishment so the
//! exchange driver can run against TCP in production and in-memory pipes in
//! tests.

use crate::error::TunnelError;
use crate::tunnel::types::ProxyAddress;
use std::future::Future;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Trait for opening byte streams to the proxy.
pub trait Transport: Send + Sync {
    /// Stream type produced by a successful connect.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connects to `proxy`. The caller bounds how long this may take.
    fn connect(
        &self,
        proxy: &ProxyAddress,
    ) -> impl Future<Output = Result<Self::Stream, TunnelError>> + Send;
}

/// TCP transport using tokio.
#[derive(Debug, Default, Clone)]
pub struct TcpTransport;

impl TcpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for TcpTransport {
    type Stream = TcpStream;

    fn connect(
        &self,
        proxy: &ProxyAddress,
    ) -> impl Future<Output = Result<TcpStream, TunnelError>> + Send {
        let addr = proxy.to_string();
        async move {
            match TcpStream::connect(addr.as_str()).await {
                Ok(stream) => {
                    // Small writes (CONNECT, request head) should not wait on Nagle.
                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
                    }
                    Ok(stream)
                }
                Err(source) => Err(TunnelError::Connect { addr, source }),
            }
        }
    }
}
