use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;
use crate::error::AppError;
use crate::infra::OnionDaemon;

pub async fn onion_hostname(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let hostname = state
        .daemon
        .hostname()
        .ok_or(AppError::HostnameUnavailable)?;
    Ok(Json(json!({ "hostname": hostname })))
}
