//! Tunnel service abstraction layer.
//!
//! Provides a trait-based abstraction for tunneled request execution,
//! enabling dependency injection and easier testing.

use super::executor::{run_exchange, TunnelOptions};
use super::response_builder::build_response;
use super::types::{
    Headers, HttpMethod, ProxyRequest, ProxyResponse, TunnelRequest, TunnelResponse,
};
use crate::error::TunnelError;
use crate::infra::transport::{TcpTransport, Transport};
use crate::shared::DetailedTiming;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Boxed future returned by `TunnelService` methods.
pub type TunnelFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TunnelResponse, TunnelError>> + Send + 'a>>;

/// Trait for services that execute requests through the tunnel.
pub trait TunnelService: Send + Sync {
    /// Executes one request on a fresh tunnel.
    fn execute(&self, request: TunnelRequest) -> TunnelFuture<'_>;
}

/// Tunnel client over an injectable transport.
///
/// Holds no per-request state: every call opens its own transport, so any
/// number of calls may run concurrently.
#[derive(Debug, Clone)]
pub struct TunnelClient<T = TcpTransport> {
    transport: T,
    options: TunnelOptions,
}

impl TunnelClient<TcpTransport> {
    /// Creates a TCP client for the given options.
    pub fn tcp(options: TunnelOptions) -> Self {
        Self::new(TcpTransport::new(), options)
    }
}

impl<T: Transport> TunnelClient<T> {
    pub fn new(transport: T, options: TunnelOptions) -> Self {
        Self { transport, options }
    }

    /// Wraps the client in an `Arc`.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Executes a request and also reports phase timing.
    pub async fn execute_timed(
        &self,
        request: &TunnelRequest,
        read_timeout: Option<Duration>,
    ) -> (Result<TunnelResponse, TunnelError>, DetailedTiming) {
        let mut timing = DetailedTiming::new();
        let options = match read_timeout {
            Some(limit) => self.options.clone().with_read_timeout(Some(limit)),
            None => self.options.clone(),
        };

        let result = run_exchange(&self.transport, &options, request, &mut timing).await;
        if let Err(ref e) = result {
            tracing::warn!(
                code = e.code(),
                target = %request.endpoint.authority(),
                error = %e,
                "Tunneled request failed"
            );
        }
        (result, timing)
    }
}

impl<T: Transport> TunnelService for TunnelClient<T> {
    fn execute(&self, request: TunnelRequest) -> TunnelFuture<'_> {
        Box::pin(async move { self.execute_timed(&request, None).await.0 })
    }
}

/// Extension trait for `TunnelService` that provides per-method helpers.
pub trait TunnelServiceExt: TunnelService {
    /// Executes a request built from `url`.
    fn request(
        &self,
        method: HttpMethod,
        url: &str,
        headers: Headers,
        body: Option<String>,
    ) -> TunnelFuture<'_> {
        match TunnelRequest::from_url(method, url, headers, body) {
            Ok(request) => self.execute(request),
            Err(e) => Box::pin(async move { Err::<TunnelResponse, _>(e) }),
        }
    }

    fn get(&self, url: &str, headers: Headers) -> TunnelFuture<'_> {
        self.request(HttpMethod::Get, url, headers, None)
    }

    fn post(&self, url: &str, headers: Headers, body: Option<String>) -> TunnelFuture<'_> {
        self.request(HttpMethod::Post, url, headers, body)
    }

    fn put(&self, url: &str, headers: Headers, body: Option<String>) -> TunnelFuture<'_> {
        self.request(HttpMethod::Put, url, headers, body)
    }

    fn delete(&self, url: &str, headers: Headers) -> TunnelFuture<'_> {
        self.request(HttpMethod::Delete, url, headers, None)
    }
}

// Implement TunnelServiceExt for all types that implement TunnelService
impl<T: TunnelService + ?Sized> TunnelServiceExt for T {}

/// Executes an API proxy request and renders the response.
pub async fn execute_request<T: Transport>(
    client: &TunnelClient<T>,
    request: ProxyRequest,
) -> Result<ProxyResponse, TunnelError> {
    let method = request.method.parse::<HttpMethod>()?;

    let mut headers: Headers = request.headers.into_iter().collect();
    headers.sort();

    let tunnel_request = TunnelRequest::from_url(method, &request.url, headers, request.body)?;

    // Zero means "no override", like an unset value.
    let read_timeout = request
        .timeout
        .filter(|ms| *ms != 0)
        .map(Duration::from_millis);
    let (result, timing) = client.execute_timed(&tunnel_request, read_timeout).await;

    Ok(build_response(result?, timing, request.url))
}
