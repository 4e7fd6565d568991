//! Job trigger handlers.
//!
//! Trigger endpoints always answer with the job envelope and an explicit
//! `success` flag:
//!
//! ```text
//! 200 { "success": true,  "message", "output", "truncated" }
//! 500 { "success": false, "message", "error", "code", "timedOut", "reason", "truncated" }
//! ```
//!
//! Unknown kinds use the failure envelope with 404 and a busy kind with 409.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oddsy_core::jobs::JobKind;
use serde::Serialize;

use crate::engine::active::ActiveJobSummary;
use crate::engine::dispatcher::{DispatchOutcome, FailureReason, JobFailure};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct JobSuccessBody {
    pub success: bool,
    pub message: String,
    pub output: String,
    /// Output was cut at the per-stream capture limit.
    pub truncated: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailureBody {
    pub success: bool,
    pub message: String,
    pub error: String,
    /// Worker exit code, `null` when unknown.
    pub code: Option<i32>,
    pub timed_out: bool,
    pub reason: FailureReason,
    pub truncated: bool,
}

/// Response for a job trigger.
#[derive(Debug)]
pub enum JobResponse {
    Success(JobSuccessBody),
    Failure(StatusCode, JobFailureBody),
}

impl JobResponse {
    fn from_outcome(outcome: DispatchOutcome, timeout_secs: u64) -> Self {
        match outcome {
            DispatchOutcome::Succeeded { output, truncated } => Self::Success(JobSuccessBody {
                success: true,
                message: "Script completed successfully".to_string(),
                output: output.trim_end().to_string(),
                truncated,
            }),
            DispatchOutcome::Failed(failure) => {
                let status = failure_status(failure.reason);
                Self::Failure(status, failure_body(failure, timeout_secs))
            }
        }
    }
}

impl IntoResponse for JobResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::Failure(status, body) => (status, Json(body)).into_response(),
        }
    }
}

fn failure_status(reason: FailureReason) -> StatusCode {
    match reason {
        FailureReason::ConfigurationError => StatusCode::NOT_FOUND,
        FailureReason::Busy => StatusCode::CONFLICT,
        FailureReason::NonZeroExit
        | FailureReason::Timeout
        | FailureReason::LaunchFailure
        | FailureReason::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_body(failure: JobFailure, timeout_secs: u64) -> JobFailureBody {
    let message = match failure.reason {
        FailureReason::NonZeroExit => "Script failed".to_string(),
        FailureReason::Timeout => format!("Script timed out after {timeout_secs}s"),
        FailureReason::LaunchFailure => "Script could not be started".to_string(),
        FailureReason::ConfigurationError => "Unknown job kind".to_string(),
        FailureReason::Busy => "Script is already running".to_string(),
        FailureReason::Internal => "Script supervision failed".to_string(),
    };

    JobFailureBody {
        success: false,
        message,
        timed_out: failure.timed_out(),
        error: failure.error.trim_end().to_string(),
        code: failure.code,
        reason: failure.reason,
        truncated: failure.truncated,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /jobs/{kind}
///
/// Run the worker for `kind` and wait for its terminal result.
pub async fn trigger_job(State(state): State<AppState>, Path(kind): Path<String>) -> JobResponse {
    let outcome = state.dispatcher.dispatch_slug(&kind).await;
    JobResponse::from_outcome(outcome, state.dispatcher.timeout().as_secs())
}

/// POST /api/run-oran
pub async fn run_odds(State(state): State<AppState>) -> JobResponse {
    run_kind(state, JobKind::Odds).await
}

/// POST /api/run-kart-korner
pub async fn run_card_corner(State(state): State<AppState>) -> JobResponse {
    run_kind(state, JobKind::CardCorner).await
}

async fn run_kind(state: AppState, kind: JobKind) -> JobResponse {
    let outcome = state.dispatcher.dispatch(kind).await;
    JobResponse::from_outcome(outcome, state.dispatcher.timeout().as_secs())
}

/// GET /jobs
///
/// Running jobs with their output so far.
pub async fn list_active(State(state): State<AppState>) -> Json<DataResponse<Vec<ActiveJobSummary>>> {
    let data = state.dispatcher.active().summaries().await;
    Json(DataResponse { data })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
