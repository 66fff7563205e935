use axum::extract::State;
use axum::Json;

use crate::session::SessionStats;
use crate::state::AppState;

pub async fn metrics(State(state): State<AppState>) -> Json<SessionStats> {
    Json(state.sessions.stats())
}
