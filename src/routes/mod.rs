pub mod health;
pub mod hostname;
pub mod proxy;

use crate::infra::ExternalDaemon;
use crate::tunnel::TunnelClient;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<TunnelClient>,
    pub daemon: Arc<ExternalDaemon>,
}

/// Builds the API router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/hostname", get(hostname::onion_hostname))
        .route("/api/proxy", post(proxy::proxy_request))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
