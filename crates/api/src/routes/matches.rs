use axum::routing::{get, post};
use axum::Router;

use crate::handlers::matches;
use crate::state::AppState;

/// Live match mirror routes.
///
/// ```text
/// GET  /matches           -> get_snapshot
/// POST /matches/refresh   -> refresh
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/matches", get(matches::get_snapshot))
        .route("/matches/refresh", post(matches::refresh))
}
