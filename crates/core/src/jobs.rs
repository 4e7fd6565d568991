//! Job kinds and the static worker table.
//!
//! The set of invocable workers is closed: every [`JobKind`] maps to exactly
//! one [`WorkerSpec`] through a `match` in [`WorkerTable::resolve`]. Unknown
//! kinds are rejected while parsing, before any process could be spawned.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::runner::invocation::WorkerInvocation;
use crate::types::JobId;

/// Environment variables applied to every worker so Python output is
/// flushed as it is produced and decoded consistently.
const WORKER_ENV: [(&str, &str); 2] = [("PYTHONUNBUFFERED", "1"), ("PYTHONIOENCODING", "utf-8")];

/// The kinds of analysis job a caller can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// Odds scraper bot (`oran`).
    #[serde(rename = "oran")]
    Odds,
    /// Card and corner statistics bot (`kart-korner`).
    #[serde(rename = "kart-korner")]
    CardCorner,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Odds, JobKind::CardCorner];

    /// Wire name used in routes and logs.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Odds => "oran",
            Self::CardCorner => "kart-korner",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| CoreError::UnknownJobKind(s.to_string()))
    }
}

/// A single trigger for a job of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRequest {
    pub id: JobId,
    pub kind: JobKind,
}

impl JobRequest {
    /// Create a request with a fresh invocation id.
    pub fn new(kind: JobKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            kind,
        }
    }
}

/// Program, arguments and working directory for one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_directory: PathBuf,
}

impl WorkerSpec {
    /// Build a spec, rejecting an empty program path.
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        working_directory: impl Into<PathBuf>,
    ) -> Result<Self, CoreError> {
        let program = program.into();
        if program.as_os_str().is_empty() {
            return Err(CoreError::Validation(
                "worker program must not be empty".to_string(),
            ));
        }
        Ok(Self {
            program,
            args,
            working_directory: working_directory.into(),
        })
    }
}

/// Fixed mapping from job kind to worker.
#[derive(Debug, Clone)]
pub struct WorkerTable {
    pub odds: WorkerSpec,
    pub card_corner: WorkerSpec,
}

impl WorkerTable {
    pub fn resolve(&self, kind: JobKind) -> &WorkerSpec {
        match kind {
            JobKind::Odds => &self.odds,
            JobKind::CardCorner => &self.card_corner,
        }
    }

    /// Build the invocation for `request`, including the per-job environment
    /// overrides (`JOB_ID`, `JOB_KIND` and the Python stream settings).
    pub fn invocation(&self, request: &JobRequest) -> WorkerInvocation {
        let spec = self.resolve(request.kind);

        let mut environment: Vec<(String, String)> = WORKER_ENV
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment.push(("JOB_ID".to_string(), request.id.to_string()));
        environment.push(("JOB_KIND".to_string(), request.kind.slug().to_string()));

        WorkerInvocation {
            job_id: request.id,
            program: spec.program.clone(),
            args: spec.args.clone(),
            working_directory: spec.working_directory.clone(),
            environment,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
