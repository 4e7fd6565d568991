use axum::extract::State;
use axum::Json;
use oddsy_core::status::LivenessReport;

use crate::state::AppState;

/// GET /status -- always `{ "status": "online" }` while the process is up.
pub async fn get_status(State(state): State<AppState>) -> Json<LivenessReport> {
    Json(state.dispatcher.status())
}
