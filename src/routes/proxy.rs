use axum::{extract::State, Json};

use super::AppState;
use crate::error::AppError;
use crate::tunnel::{execute_request, ProxyRequest, ProxyResponse};

pub async fn proxy_request(
    State(state): State<AppState>,
    Json(request): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>, AppError> {
    tracing::debug!(
        method = %request.method,
        url = %request.url,
        "Tunneling request"
    );

    match execute_request(state.client.as_ref(), request).await {
        Ok(response) => {
            tracing::debug!(status = response.data.status, "Request succeeded");
            Ok(Json(response))
        }
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "Request failed");
            Err(e.into())
        }
    }
}
