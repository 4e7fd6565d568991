//! Job dispatcher.
//!
//! Resolves a job kind to its worker, runs it through the process runner
//! with the configured deadline and shapes the terminal result into a
//! [`DispatchOutcome`]. Every failure, including launch failures and
//! rejected triggers, is reported as an outcome rather than an error.
//!
//! Dispatches of different kinds are independent: each spawns its own worker
//! and nothing is queued. A second trigger for a kind that is already running
//! is rejected with [`FailureReason::Busy`] instead of racing the first one
//! on the same working directory.

use std::sync::Arc;
use std::time::Duration;

use oddsy_core::jobs::{JobKind, JobRequest, WorkerTable};
use oddsy_core::runner::{self, JobResult, OutputBuffer, RunnerError};
use oddsy_core::status::{self, LivenessReport};
use serde::Serialize;
use tracing::Instrument;

use super::active::{ActiveJob, ActiveJobs};

/// Why a dispatch did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The worker ran and exited with a non-zero code (or was killed by a signal).
    NonZeroExit,
    /// The worker exceeded the deadline and was killed.
    Timeout,
    /// The worker could not be started.
    LaunchFailure,
    /// The job kind is not known; nothing was spawned.
    ConfigurationError,
    /// A job of this kind is already running; nothing was spawned.
    Busy,
    /// The worker could not be supervised.
    Internal,
}

/// Details of a failed dispatch.
#[derive(Debug, Clone)]
pub struct JobFailure {
    pub reason: FailureReason,
    /// Captured stderr, or a description of why no worker ran.
    pub error: String,
    /// Worker exit code, when it exited on its own.
    pub code: Option<i32>,
    /// Captured output hit the per-stream cap and was cut.
    pub truncated: bool,
}

impl JobFailure {
    fn rejected(reason: FailureReason, error: impl Into<String>) -> Self {
        Self {
            reason,
            error: error.into(),
            code: None,
            truncated: false,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.reason == FailureReason::Timeout
    }
}

/// Terminal outcome of one dispatch.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Succeeded { output: String, truncated: bool },
    Failed(JobFailure),
}

/// Maps job kinds to workers and runs them.
pub struct JobDispatcher {
    workers: WorkerTable,
    timeout: Duration,
    active: Arc<ActiveJobs>,
}

impl JobDispatcher {
    pub fn new(workers: WorkerTable, timeout: Duration) -> Self {
        Self {
            workers,
            timeout,
            active: Arc::new(ActiveJobs::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn active(&self) -> &Arc<ActiveJobs> {
        &self.active
    }

    /// Liveness, independent of any running job.
    pub fn status(&self) -> LivenessReport {
        status::current()
    }

    /// Parse `slug` and dispatch it. Unknown slugs fail before any process
    /// is spawned.
    pub async fn dispatch_slug(&self, slug: &str) -> DispatchOutcome {
        match slug.parse::<JobKind>() {
            Ok(kind) => self.dispatch(kind).await,
            Err(e) => {
                tracing::warn!(slug, "Rejected trigger for unknown job kind");
                DispatchOutcome::Failed(JobFailure::rejected(
                    FailureReason::ConfigurationError,
                    e.to_string(),
                ))
            }
        }
    }

    /// Run the worker for `kind` to completion or timeout.
    ///
    /// The invocation runs on its own task, so it keeps its deadline and its
    /// active-jobs entry even if the caller goes away mid-run.
    pub async fn dispatch(&self, kind: JobKind) -> DispatchOutcome {
        let request = JobRequest::new(kind);
        let stdout = OutputBuffer::new();
        let stderr = OutputBuffer::new();

        let guard = match self.active.try_register(ActiveJob {
            id: request.id,
            kind,
            started_at: chrono::Utc::now(),
            stdout: stdout.handle(),
            stderr: stderr.handle(),
        }) {
            Ok(guard) => guard,
            Err(running) => {
                tracing::warn!(%kind, %running, "Rejected trigger, job already running");
                return DispatchOutcome::Failed(JobFailure::rejected(
                    FailureReason::Busy,
                    format!("A {kind} job is already running ({running})"),
                ));
            }
        };

        let invocation = self.workers.invocation(&request);
        let timeout = self.timeout;
        let span = tracing::info_span!("dispatch", job_id = %request.id, %kind);

        let task = tokio::spawn(
            async move {
                let _guard = guard;
                runner::run_with_output(invocation, timeout, stdout, stderr).await
            }
            .instrument(span),
        );

        match task.await {
            Ok(Ok(result)) => outcome_from_result(result),
            Ok(Err(err @ RunnerError::Launch { .. })) => {
                tracing::error!(job_id = %request.id, %kind, error = %err, "Worker failed to launch");
                DispatchOutcome::Failed(JobFailure::rejected(
                    FailureReason::LaunchFailure,
                    err.to_string(),
                ))
            }
            Ok(Err(err @ RunnerError::Supervise(_))) => {
                tracing::error!(job_id = %request.id, %kind, error = %err, "Worker supervision failed");
                DispatchOutcome::Failed(JobFailure::rejected(FailureReason::Internal, err.to_string()))
            }
            Err(join_err) => {
                tracing::error!(job_id = %request.id, %kind, error = %join_err, "Worker task aborted");
                DispatchOutcome::Failed(JobFailure::rejected(
                    FailureReason::Internal,
                    "Worker task aborted",
                ))
            }
        }
    }
}

/// Shape a runner result into an outcome.
pub fn outcome_from_result(result: JobResult) -> DispatchOutcome {
    if result.succeeded {
        return DispatchOutcome::Succeeded {
            output: result.stdout,
            truncated: result.truncated,
        };
    }

    let reason = if result.timed_out {
        FailureReason::Timeout
    } else {
        FailureReason::NonZeroExit
    };

    DispatchOutcome::Failed(JobFailure {
        reason,
        error: result.stderr,
        code: result.exit_code,
        truncated: result.truncated,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
