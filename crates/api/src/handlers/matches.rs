//! Live match snapshot handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oddsy_core::matches::LiveMatchSnapshot;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /matches
///
/// The current snapshot, or 404 until the first successful mirror cycle.
pub async fn get_snapshot(State(state): State<AppState>) -> AppResult<Json<LiveMatchSnapshot>> {
    state
        .mirror
        .store()
        .current()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No live match snapshot yet".to_string()))
}

/// POST /matches/refresh
///
/// Run one mirror cycle now. Answers `{ success, count }`; on failure the
/// previous snapshot is left in place and `{ success: false, error }` is
/// returned with 500.
pub async fn refresh(State(state): State<AppState>) -> Response {
    match state.mirror.run_cycle().await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(json!({ "success": true, "count": snapshot.matches.len() })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "On-demand mirror refresh failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
