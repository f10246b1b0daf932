use onion_http_tunnel::{
    config::Config,
    infra::{ExternalDaemon, OnionDaemon},
    routes::{self, AppState},
    tunnel::{types::ProxyAddress, TunnelClient, TunnelOptions},
};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "onion_http_tunnel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let proxy = ProxyAddress::loopback(config.proxy_port);
    tracing::info!(
        port = config.port,
        proxy = %proxy,
        "Starting onion HTTP tunnel"
    );

    let daemon = Arc::new(ExternalDaemon::new(
        proxy.clone(),
        config.hidden_service_dir.clone(),
        config.daemon_ready_timeout,
    ));

    // Serve regardless; each request fails on its own if the proxy stays down.
    let readiness = daemon.clone();
    tokio::spawn(async move {
        if let Err(e) = readiness.start().await {
            tracing::warn!(error = %e, "Daemon not ready");
        }
    });

    let options = TunnelOptions::new(proxy)
        .with_connect_timeout(config.connect_timeout)
        .with_read_timeout(config.read_timeout);
    let client = TunnelClient::tcp(options).arc();

    let app = routes::router(AppState {
        client,
        daemon: daemon.clone(),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    daemon.stop().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
