pub mod jobs;
pub mod matches;
pub mod status;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree.
///
/// Route hierarchy:
///
/// ```text
/// /status                         liveness (GET)
/// /jobs                           running jobs with partial output (GET)
/// /jobs/{kind}                    run a worker to completion (POST)
/// /matches                        current live match snapshot (GET)
/// /matches/refresh                run one mirror cycle now (POST)
///
/// /api/status                     liveness, legacy path (GET)
/// /api/run-oran                   odds worker, legacy path (POST)
/// /api/run-kart-korner            card/corner worker, legacy path (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(status::router())
        .merge(jobs::router())
        .merge(matches::router())
}
