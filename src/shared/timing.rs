//! Timing utilities for tunneled exchanges.
//!
//! Provides per-phase timing of a single exchange.

use crate::tunnel::types::TimingInfo;
use std::time::Instant;

/// Detailed timing measurements for exchange phases.
///
/// Tracks the start and end time of each phase:
/// - Connection to the local proxy
/// - CONNECT handshake
/// - Time to first response byte (TTFB) after the request is sent
/// - Accumulation until the peer closes
#[derive(Debug, Clone)]
pub struct DetailedTiming {
    pub connect_start: Option<Instant>,
    pub connect_end: Option<Instant>,
    pub handshake_start: Option<Instant>,
    pub handshake_end: Option<Instant>,
    pub request_sent: Option<Instant>,
    pub ttfb: Option<Instant>,
    pub download_end: Option<Instant>,
    pub total_start: Instant,
}

impl DetailedTiming {
    /// Creates a new `DetailedTiming` instance with the total timer started.
    pub fn new() -> Self {
        Self {
            connect_start: None,
            connect_end: None,
            handshake_start: None,
            handshake_end: None,
            request_sent: None,
            ttfb: None,
            download_end: None,
            total_start: Instant::now(),
        }
    }

    /// Converts the measurements into a serializable `TimingInfo`.
    pub fn to_timing_info(&self) -> TimingInfo {
        let total = self
            .download_end
            .unwrap_or_else(Instant::now)
            .duration_since(self.total_start)
            .as_millis() as u64;

        TimingInfo {
            total,
            connect: span(self.connect_start, self.connect_end),
            handshake: span(self.handshake_start, self.handshake_end),
            ttfb: span(self.request_sent, self.ttfb),
            download: span(self.ttfb, self.download_end),
        }
    }

    pub fn start_connect(&mut self) {
        self.connect_start = Some(Instant::now());
    }

    pub fn end_connect(&mut self) {
        self.connect_end = Some(Instant::now());
    }

    pub fn start_handshake(&mut self) {
        self.handshake_start = Some(Instant::now());
    }

    pub fn end_handshake(&mut self) {
        self.handshake_end = Some(Instant::now());
    }

    pub fn mark_request_sent(&mut self) {
        self.request_sent = Some(Instant::now());
    }

    /// Records the first response byte; later calls are ignored.
    pub fn mark_ttfb(&mut self) {
        if self.request_sent.is_some() && self.ttfb.is_none() {
            self.ttfb = Some(Instant::now());
        }
    }

    pub fn end_download(&mut self) {
        self.download_end = Some(Instant::now());
    }
}

impl Default for DetailedTiming {
    fn default() -> Self {
        Self::new()
    }
}

fn span(start: Option<Instant>, end: Option<Instant>) -> Option<u64> {
    match (start, end) {
        (Some(s), Some(e)) => Some(e.duration_since(s).as_millis() as u64),
        _ => None,
    }
}
