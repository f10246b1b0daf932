//! Infrastructure layer providing abstractions for external collaborators.
//!
//! This module contains traits and implementations for:
//! - Byte-stream transport to the local proxy
//! - The anonymity daemon that owns that proxy
//!
//! Both are injected into the tunnel client so protocol logic can be tested
//! without a real network or daemon.

pub mod daemon;
pub mod transport;

pub use daemon::{ExternalDaemon, OnionDaemon};
pub use transport::{TcpTransport, Transport};
