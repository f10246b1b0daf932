//! Exchange execution over a live transport.
//!
//! Binds the pure state machine in `exchange` to an async byte stream: every
//! read becomes an `Event`, and the driver writes the application request as
//! soon as the state reports the tunnel open. The transport is shut down
//! exactly once on every exit path after it was opened.

use super::exchange::{Event, ExchangeState};
use super::handshake::connect_request;
use super::types::{ProxyAddress, TunnelRequest, TunnelResponse};
use super::writer::write_request;
use crate::config::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_PROXY_PORT};
use crate::error::TunnelError;
use crate::infra::transport::Transport;
use crate::shared::DetailedTiming;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// Size of each read from the transport.
const READ_CHUNK_SIZE: usize = 8192;

/// Per-client exchange settings.
#[derive(Debug, Clone)]
pub struct TunnelOptions {
    pub proxy: ProxyAddress,
    pub connect_timeout: Duration,
    /// Idle bound per read; `None` waits for close indefinitely.
    pub read_timeout: Option<Duration>,
}

impl TunnelOptions {
    pub fn new(proxy: ProxyAddress) -> Self {
        Self {
            proxy,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            read_timeout: None,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

impl Default for TunnelOptions {
    fn default() -> Self {
        Self::new(ProxyAddress::loopback(DEFAULT_PROXY_PORT))
    }
}

/// Runs one exchange on a fresh transport connection.
pub async fn run_exchange<T: Transport>(
    transport: &T,
    options: &TunnelOptions,
    request: &TunnelRequest,
    timing: &mut DetailedTiming,
) -> Result<TunnelResponse, TunnelError> {
    timing.start_connect();
    let connecting = transport.connect(&options.proxy);
    let mut stream = match timeout(options.connect_timeout, connecting).await {
        Ok(connected) => connected?,
        Err(_) => {
            return Err(TunnelError::ConnectTimeout {
                addr: options.proxy.to_string(),
                timeout: options.connect_timeout,
            })
        }
    };
    timing.end_connect();

    tracing::debug!(
        proxy = %options.proxy,
        target = %request.endpoint.authority(),
        "Connected to proxy"
    );

    let outcome = drive(&mut stream, request, options.read_timeout, timing).await;

    if let Err(e) = stream.shutdown().await {
        tracing::debug!(error = %e, "Transport shutdown failed");
    }

    outcome
}

/// Feeds transport events into the state machine until it finishes.
async fn drive<S>(
    stream: &mut S,
    request: &TunnelRequest,
    read_timeout: Option<Duration>,
    timing: &mut DetailedTiming,
) -> Result<TunnelResponse, TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    timing.start_handshake();
    let mut state = match send_connect(stream, request).await {
        Ok(()) => ExchangeState::new(),
        Err(e) => ExchangeState::new().advance(Event::Failed(e)),
    };

    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    let outcome = loop {
        if let ExchangeState::Finished(outcome) = state {
            break outcome;
        }

        if state.is_tunneled() {
            timing.end_handshake();
            tracing::debug!(target = %request.endpoint.authority(), "Tunnel established");

            state = match write_request(stream, request).await {
                Ok(()) => {
                    timing.mark_request_sent();
                    tracing::debug!(
                        method = %request.method,
                        path = %request.path,
                        body_bytes = request.body.as_ref().map_or(0, |b| b.len()),
                        "Request sent"
                    );
                    state.advance(Event::RequestSent)
                }
                Err(e) => state.advance(Event::Failed(e)),
            };
            continue;
        }

        let read = match read_timeout {
            Some(limit) => match timeout(limit, stream.read(&mut chunk)).await {
                Ok(read) => read,
                Err(_) => {
                    state = state.advance(Event::Stalled(limit));
                    continue;
                }
            },
            None => stream.read(&mut chunk).await,
        };

        state = match read {
            Ok(0) => state.advance(Event::Eof),
            Ok(n) => {
                timing.mark_ttfb();
                state.advance(Event::Data(&chunk[..n]))
            }
            Err(e) => state.advance(Event::Failed(e)),
        };
    };

    timing.end_download();

    match &outcome {
        Ok(response) => tracing::debug!(
            status = response.status_code,
            body_bytes = response.body_bytes.len(),
            "Response received"
        ),
        Err(e) => tracing::debug!(error = %e, "Exchange failed"),
    }

    outcome
}

async fn send_connect<S>(stream: &mut S, request: &TunnelRequest) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream
        .write_all(connect_request(&request.endpoint).as_bytes())
        .await?;
    stream.flush().await
}
