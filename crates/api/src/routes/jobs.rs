//! Route definitions for job triggers.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// ```text
/// GET  /jobs                  -> list_active
/// POST /jobs/{kind}           -> trigger_job
/// POST /api/run-oran          -> run_odds
/// POST /api/run-kart-korner   -> run_card_corner
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(jobs::list_active))
        .route("/jobs/{kind}", post(jobs::trigger_job))
        .route("/api/run-oran", post(jobs::run_odds))
        .route("/api/run-kart-korner", post(jobs::run_card_corner))
}
