//! Liveness reporting.
//!
//! The reported state is independent of job execution: while the process is
//! able to answer at all, it is online.

use serde::Serialize;

/// Operational state reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
}

/// Body of a liveness report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LivenessReport {
    pub status: ServiceState,
}

/// Current liveness. Pure and infallible.
pub fn current() -> LivenessReport {
    LivenessReport {
        status: ServiceState::Online,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
