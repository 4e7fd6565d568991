use axum::routing::get;
use axum::Router;

use crate::handlers::status;
use crate::state::AppState;

/// Liveness routes.
///
/// ```text
/// GET /status       -> get_status
/// GET /api/status   -> get_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::get_status))
        .route("/api/status", get(status::get_status))
}
