use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::render::RenderConfig;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub upstream: String,
    pub display: RenderConfig,
    pub telemetry_enabled: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: concat!("aichecking-v", env!("CARGO_PKG_VERSION")).to_string(),
        upstream: state.checker.upstream().to_string(),
        display: *state.checker.render_config(),
        telemetry_enabled: state.config.telemetry.is_some(),
    })
}
