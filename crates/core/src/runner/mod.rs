//! External worker process runner.
//!
//! Spawns one OS process per invocation, streams its output into append-only
//! buffers and enforces a hard deadline. See [`process::run`].

pub mod invocation;
pub mod output;
pub mod process;

pub use invocation::{JobResult, RunnerError, WorkerInvocation};
pub use output::{OutputBuffer, OutputHandle};
pub use process::{run, run_with_output};
