use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports whether each upstream has the settings it needs. Upstreams are
/// not contacted.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    services.insert(
        "chat".to_string(),
        configured(state.chat_client.is_configured()),
    );
    services.insert(
        "inference".to_string(),
        configured(state.inference_client.is_configured()),
    );
    services.insert(
        "attestation".to_string(),
        configured(state.attestation.is_configured()),
    );

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}

fn configured(ready: bool) -> String {
    let status = if ready { "configured" } else { "missing credentials" };
    status.to_string()
}
