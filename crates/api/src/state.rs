use std::sync::Arc;

use oddsy_mirror::MatchMirror;

use crate::engine::dispatcher::JobDispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Job dispatcher, which also owns the active-jobs table.
    pub dispatcher: Arc<JobDispatcher>,
    /// Live match mirror (feed client plus snapshot store).
    pub mirror: Arc<MatchMirror>,
}
