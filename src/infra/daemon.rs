//! Anonymity daemon collaborator.
//!
//! The daemon itself (launch, bootstrap, onion service publication) is run
//! outside this crate. This module only observes it: readiness is the proxy
//! port accepting connections, and the onion hostname is the `hostname` file
//! the daemon writes into its hidden service directory.

use crate::error::DaemonError;
use crate::tunnel::types::ProxyAddress;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Delay between proxy readiness checks.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Lifecycle of the daemon that provides the local proxy.
pub trait OnionDaemon: Send + Sync {
    /// Resolves once the daemon is ready to tunnel, or fails.
    fn start(&self) -> impl Future<Output = Result<(), DaemonError>> + Send;

    /// Releases the daemon.
    fn stop(&self) -> impl Future<Output = ()> + Send;

    /// Published onion hostname, if any.
    fn hostname(&self) -> Option<String>;
}

/// A daemon launched and supervised outside this process.
pub struct ExternalDaemon {
    proxy: ProxyAddress,
    hidden_service_dir: Option<PathBuf>,
    ready_timeout: Duration,
    ready: AtomicBool,
}

impl ExternalDaemon {
    pub fn new(
        proxy: ProxyAddress,
        hidden_service_dir: Option<PathBuf>,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            proxy,
            hidden_service_dir,
            ready_timeout,
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn wait_for_proxy(&self) -> Result<(), DaemonError> {
        let addr = self.proxy.to_string();
        let started = Instant::now();

        loop {
            match TcpStream::connect(addr.as_str()).await {
                Ok(_) => {
                    tracing::info!(
                        proxy = %addr,
                        waited_ms = started.elapsed().as_millis() as u64,
                        "Daemon proxy is accepting connections"
                    );
                    return Ok(());
                }
                Err(e) => {
                    let waited = started.elapsed();
                    if waited >= self.ready_timeout {
                        tracing::warn!(
                            proxy = %addr,
                            error = %e,
                            "Daemon proxy did not become ready"
                        );
                        return Err(DaemonError::NotReady { addr, waited });
                    }
                    tracing::debug!(proxy = %addr, error = %e, "Daemon proxy not ready yet");
                }
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

impl OnionDaemon for ExternalDaemon {
    fn start(&self) -> impl Future<Output = Result<(), DaemonError>> + Send {
        async move {
            let result = self.wait_for_proxy().await;
            if result.is_ok() {
                self.ready.store(true, Ordering::Release);
            }
            result
        }
    }

    fn stop(&self) -> impl Future<Output = ()> + Send {
        async move {
            if self.ready.swap(false, Ordering::AcqRel) {
                tracing::info!(proxy = %self.proxy, "Daemon released");
            }
        }
    }

    fn hostname(&self) -> Option<String> {
        let path = self.hidden_service_dir.as_ref()?.join("hostname");
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let hostname = contents.trim();
                (!hostname.is_empty()).then(|| hostname.to_string())
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Onion hostname not available");
                None
            }
        }
    }
}
