//! Worker process supervision.
//!
//! [`run`] spawns one worker, streams its stdout/stderr into
//! [`OutputBuffer`]s as chunks arrive, and races the worker's exit against the
//! deadline. The race is resolved exactly once by `tokio::select!`: the losing
//! future is dropped and has no further effect. On timeout the worker's whole
//! process group is killed and the child is reaped before returning.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::invocation::{JobResult, RunnerError, WorkerInvocation};
use super::output::OutputBuffer;
use crate::types::JobId;

/// Read size for a single pipe read.
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// How long reader tasks may keep draining pipes after the worker resolved.
///
/// A detached grandchild can hold a pipe open indefinitely; after this grace
/// period the readers are aborted and whatever was captured is returned.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Run `invocation` to completion or until `timeout` elapses.
pub async fn run(invocation: WorkerInvocation, timeout: Duration) -> Result<JobResult, RunnerError> {
    run_with_output(invocation, timeout, OutputBuffer::new(), OutputBuffer::new()).await
}

/// Like [`run`], but accumulates into caller-provided buffers so that the
/// caller can hold [`OutputHandle`](super::output::OutputHandle)s and observe
/// partial output while the worker runs.
pub async fn run_with_output(
    invocation: WorkerInvocation,
    timeout: Duration,
    stdout: OutputBuffer,
    stderr: OutputBuffer,
) -> Result<JobResult, RunnerError> {
    let job_id = invocation.job_id;
    let stdout_view = stdout.handle();
    let stderr_view = stderr.handle();

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .current_dir(&invocation.working_directory)
        .envs(invocation.environment.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group, so a timeout can take down anything the worker forked.
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(|source| RunnerError::Launch {
        program: invocation.program.display().to_string(),
        source,
    })?;

    tracing::info!(
        %job_id,
        program = %invocation.program.display(),
        working_directory = %invocation.working_directory.display(),
        pid = child.id(),
        timeout_secs = timeout.as_secs(),
        "Worker started"
    );

    let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
    if let Some(pipe) = child.stdout.take() {
        readers.push(tokio::spawn(pump(pipe, stdout, job_id, "stdout")));
    }
    if let Some(pipe) = child.stderr.take() {
        readers.push(tokio::spawn(pump(pipe, stderr, job_id, "stderr")));
    }

    let exited = tokio::select! {
        status = child.wait() => Some(status),
        () = tokio::time::sleep(timeout) => None,
    };

    let (exit_code, timed_out) = match exited {
        Some(status) => {
            let status = status.map_err(RunnerError::Supervise)?;
            (status.code(), false)
        }
        None => {
            tracing::warn!(%job_id, timeout_secs = timeout.as_secs(), "Worker exceeded deadline, killing");
            terminate(&mut child).await?;
            (None, true)
        }
    };

    drain(readers, job_id).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let result = JobResult {
        succeeded: !timed_out && exit_code == Some(0),
        exit_code,
        stdout: stdout_view.text().await,
        stderr: stderr_view.text().await,
        timed_out,
        duration_ms,
        truncated: stdout_view.is_truncated().await || stderr_view.is_truncated().await,
    };

    tracing::info!(
        %job_id,
        succeeded = result.succeeded,
        exit_code = ?result.exit_code,
        timed_out,
        duration_ms,
        "Worker finished"
    );

    Ok(result)
}

/// Copy a pipe into `sink` chunk by chunk until EOF.
async fn pump<R: AsyncRead + Unpin>(
    mut pipe: R,
    sink: OutputBuffer,
    job_id: JobId,
    stream: &'static str,
) {
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                tracing::debug!(
                    %job_id,
                    stream,
                    output = %String::from_utf8_lossy(&chunk[..n]).trim_end(),
                    "Worker output"
                );
                sink.append(&chunk[..n]).await;
            }
            Err(e) => {
                tracing::warn!(%job_id, stream, error = %e, "Failed to read worker output");
                break;
            }
        }
    }
}

/// Kill the worker's process group, then kill and reap the child itself.
///
/// Returns only once the child has been reaped, i.e. it is confirmed gone.
async fn terminate(child: &mut Child) -> Result<(), RunnerError> {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // Safety: killpg only sends a signal; the group id is the child's
            // pid because it was spawned with `process_group(0)`.
            let ret = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
            if ret != 0 {
                tracing::debug!(
                    pid,
                    error = %std::io::Error::last_os_error(),
                    "killpg failed, falling back to killing the worker alone"
                );
            }
        }
    }

    if let Err(e) = child.kill().await {
        // The worker may have exited between the deadline and the kill.
        match child.try_wait() {
            Ok(Some(_)) => {}
            _ => return Err(RunnerError::Supervise(e)),
        }
    }
    Ok(())
}

/// Wait for reader tasks to hit EOF, aborting them after the grace period.
async fn drain(readers: Vec<JoinHandle<()>>, job_id: JobId) {
    let aborts: Vec<_> = readers.iter().map(JoinHandle::abort_handle).collect();
    let all = async {
        for reader in readers {
            let _ = reader.await;
        }
    };
    if tokio::time::timeout(OUTPUT_DRAIN_GRACE, all).await.is_err() {
        tracing::warn!(%job_id, "Worker output still open after exit, abandoning readers");
        for abort in aborts {
            abort.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
