use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::{io, time::Duration};
use thiserror::Error;

/// Terminal failures of a single tunneled exchange.
///
/// Every variant is surfaced only after the transport has been closed.
#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Proxy connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Proxy connection to {addr} timed out after {}ms", .timeout.as_millis())]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("Proxy handshake failed: {0}")]
    ProxyHandshakeFailed(String),

    #[error("Connection closed before a response was received")]
    ConnectionClosedEarly,

    #[error("No data received for {}ms", .0.as_millis())]
    ReadTimeout(Duration),

    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),
}

impl TunnelError {
    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            TunnelError::InvalidUrl(_) => "INVALID_URL",
            TunnelError::InvalidMethod(_) => "INVALID_METHOD",
            TunnelError::Connect { .. } => "CONNECTION_FAILED",
            TunnelError::ConnectTimeout { .. } | TunnelError::ReadTimeout(_) => "TIMEOUT",
            TunnelError::ProxyHandshakeFailed(_) => "PROXY_HANDSHAKE_FAILED",
            TunnelError::ConnectionClosedEarly => "CONNECTION_CLOSED_EARLY",
            TunnelError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// Whether the proxy itself could not be reached.
    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            TunnelError::Connect { .. } | TunnelError::ConnectTimeout { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TunnelError::ConnectTimeout { .. } | TunnelError::ReadTimeout(_)
        )
    }
}

/// Failures of the anonymity daemon collaborator.
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Daemon proxy at {addr} not ready after {}ms", .waited.as_millis())]
    NotReady { addr: String, waited: Duration },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Tunnel(#[from] TunnelError),

    #[error("Onion hostname unavailable")]
    HostnameUnavailable,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            AppError::Tunnel(e) => {
                let status = if e.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else if matches!(
                    e,
                    TunnelError::InvalidUrl(_) | TunnelError::InvalidMethod(_)
                ) {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (status, e.code())
            }
            AppError::HostnameUnavailable => (StatusCode::NOT_FOUND, "HOSTNAME_UNAVAILABLE"),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "code": error_code,
            }
        }));

        (status, body).into_response()
    }
}
