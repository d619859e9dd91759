use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Relay the upstream attestation report unchanged
pub async fn get_attestation(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let report = state
        .attestation
        .fetch_report()
        .await
        .map_err(ApiError::Attestation)?;

    Ok(Json(report))
}
