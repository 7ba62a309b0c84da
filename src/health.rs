use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `"configured"` when a model credential is present, else `"missing"`.
    pub model: String,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = if state.analyzer.has_model() {
        "configured"
    } else {
        "missing"
    };
    info!(model, "Health check passed");

    Json(HealthResponse {
        status: "OK".to_string(),
        model: model.to_string(),
    })
}
