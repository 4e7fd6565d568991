//! Invocation input, terminal result and runner errors.

use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::types::JobId;

/// Everything needed to start one worker process.
///
/// Built by the dispatcher and moved into the runner, which owns it until
/// the invocation terminates.
#[derive(Debug, Clone)]
pub struct WorkerInvocation {
    /// Identifier used for logging and the active-jobs table.
    pub job_id: JobId,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_directory: PathBuf,
    /// Overrides applied on top of the inherited environment.
    pub environment: Vec<(String, String)>,
}

/// Terminal result of one invocation. Produced exactly once by the runner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    /// `true` only when the worker exited on its own with code 0.
    pub succeeded: bool,
    /// Exit code, `None` when the worker was killed (by us or by a signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Set when either stream exceeded the capture limit.
    pub truncated: bool,
}

/// Failures that prevent the runner from producing a [`JobResult`].
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The worker could not be started (missing binary, bad working directory).
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting on or killing the worker failed.
    #[error("Failed to supervise worker: {0}")]
    Supervise(#[source] io::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
