//! State machine of a single tunneled exchange.
//!
//! `ExchangeState::advance` performs no I/O: the driver in `executor` feeds
//! it the events observed on the transport and acts on the resulting state.
//! Once `Finished`, the state absorbs every further event unchanged.

use super::handshake::{classify, HandshakeStatus};
use super::parser::parse_response;
use super::types::TunnelResponse;
use crate::error::TunnelError;
use std::{io, time::Duration};

/// Something observed on, or done to, the transport.
#[derive(Debug)]
pub enum Event<'a> {
    /// A chunk of inbound bytes, in arrival order.
    Data(&'a [u8]),
    /// The application request has been written and flushed.
    RequestSent,
    /// The peer closed its side.
    Eof,
    /// The transport reported an I/O failure.
    Failed(io::Error),
    /// No data arrived within the read bound.
    Stalled(Duration),
}

#[derive(Debug)]
pub enum ExchangeState {
    /// CONNECT sent, waiting for the proxy reply head.
    HandshakePending { buffer: Vec<u8> },
    /// Proxy acknowledged; request not written yet.
    Tunneled { buffer: Vec<u8> },
    /// Request written; collecting the response until close.
    Accumulating { buffer: Vec<u8> },
    Finished(Result<TunnelResponse, TunnelError>),
}

impl Default for ExchangeState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeState {
    pub fn new() -> Self {
        ExchangeState::HandshakePending { buffer: Vec::new() }
    }

    pub fn advance(self, event: Event<'_>) -> ExchangeState {
        use ExchangeState::*;

        match (self, event) {
            (finished @ Finished(_), _) => finished,

            (_, Event::Failed(e)) => Finished(Err(TunnelError::Transport(e))),
            (_, Event::Stalled(limit)) => Finished(Err(TunnelError::ReadTimeout(limit))),

            (HandshakePending { mut buffer }, Event::Data(chunk)) => {
                // Bytes already held were scanned when they arrived.
                let scanned = buffer.len();
                buffer.extend_from_slice(chunk);
                match classify(&buffer, scanned) {
                    HandshakeStatus::Incomplete => HandshakePending { buffer },
                    HandshakeStatus::Established { body_offset } => {
                        // Proxy reply bytes never reach the application buffer.
                        buffer.drain(..body_offset);
                        Tunneled { buffer }
                    }
                    HandshakeStatus::Rejected(text) => {
                        Finished(Err(TunnelError::ProxyHandshakeFailed(text)))
                    }
                }
            }

            (Tunneled { mut buffer }, Event::Data(chunk)) => {
                buffer.extend_from_slice(chunk);
                Tunneled { buffer }
            }
            (Tunneled { buffer }, Event::RequestSent) => Accumulating { buffer },

            (Accumulating { mut buffer }, Event::Data(chunk)) => {
                buffer.extend_from_slice(chunk);
                Accumulating { buffer }
            }
            (Accumulating { buffer }, Event::Eof) => Finished(Ok(parse_response(buffer))),

            (HandshakePending { .. } | Tunneled { .. }, Event::Eof) => {
                Finished(Err(TunnelError::ConnectionClosedEarly))
            }

            // RequestSent outside `Tunneled` is a driver bug; keep the state.
            (state, Event::RequestSent) => state,
        }
    }

    pub fn is_tunneled(&self) -> bool {
        matches!(self, ExchangeState::Tunneled { .. })
    }

    /// Consumes the state; `None` unless finished.
    pub fn into_outcome(self) -> Option<Result<TunnelResponse, TunnelError>> {
        match self {
            ExchangeState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}
