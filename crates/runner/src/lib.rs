// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Runs a single step's rendered command as a child process, streaming its
//! output line by line and enforcing a timeout and cooperative
//! cancellation.
//!
//! The command always runs under `bash -c 'set -euo pipefail\n<command>'`,
//! in its own process group, so a cancelled or timed-out step takes any
//! descendants it spawned down with it.

use devflow_core::error::EngineError;
use devflow_core::step_execution::{OutputBuffer, StepStatus};
use indexmap::IndexMap;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Grace period between SIGTERM and SIGKILL when tearing down a step's
/// process group.
pub const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);

pub struct RunRequest<'a> {
    pub command: &'a str,
    pub working_dir: Option<&'a Path>,
    pub env: &'a IndexMap<String, String>,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub status: StepStatus,
    pub exit_code: Option<i32>,
    pub output: OutputBuffer,
    pub error: Option<String>,
}

/// Run `req.command`, forwarding each captured line to `on_line` as it
/// arrives, until the process exits, the timeout elapses, or `cancel` is
/// triggered.
pub async fn run(
    req: RunRequest<'_>,
    cancel: CancellationToken,
    mut on_line: impl FnMut(&str) + Send,
) -> Result<RunOutcome, EngineError> {
    let wrapped = format!("set -euo pipefail\n{}", req.command);
    let mut cmd = Command::new("bash");
    cmd.arg("-c").arg(&wrapped).kill_on_drop(true);
    if let Some(dir) = req.working_dir {
        cmd.current_dir(dir);
    }
    for (k, v) in req.env {
        cmd.env(k, v);
    }
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|e| EngineError::StepFailure {
        step: req.command.to_string(),
        message: format!("failed to spawn: {e}"),
    })?;
    let pid = child.id().map(|p| p as i32);

    let stdout = child.stdout.take().expect("stdout piped");
    let stderr = child.stderr.take().expect("stderr piped");
    let mut output = OutputBuffer::new();

    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();

    let deadline = tokio::time::sleep(req.timeout);
    tokio::pin!(deadline);

    let outcome_status;
    let mut exit_code = None;
    let mut error = None;

    loop {
        tokio::select! {
            line = stdout_lines.next_line() => {
                match line {
                    Ok(Some(line)) => { on_line(&line); output.push(line); }
                    Ok(None) => {}
                    Err(_) => {}
                }
            }
            line = stderr_lines.next_line() => {
                match line {
                    Ok(Some(line)) => { on_line(&line); output.push(line); }
                    Ok(None) => {}
                    Err(_) => {}
                }
            }
            status = child.wait() => {
                let status = status.map_err(|e| EngineError::StepFailure {
                    step: req.command.to_string(),
                    message: format!("wait failed: {e}"),
                })?;
                exit_code = status.code();
                outcome_status = status_to_step_status(status);
                break;
            }
            _ = &mut deadline => {
                terminate(pid).await;
                outcome_status = StepStatus::TimedOut;
                error = Some(format!("step timed out after {}s", req.timeout.as_secs()));
                break;
            }
            _ = cancel.cancelled() => {
                terminate(pid).await;
                outcome_status = StepStatus::Cancelled;
                error = Some("cancelled".to_string());
                break;
            }
        }
    }

    if outcome_status == StepStatus::Failed {
        error = Some(format!("exited with status {exit_code:?}"));
    }

    Ok(RunOutcome { status: outcome_status, exit_code, output, error })
}

fn status_to_step_status(status: ExitStatus) -> StepStatus {
    if status.success() {
        StepStatus::Succeeded
    } else {
        StepStatus::Failed
    }
}

/// Send SIGTERM to the step's process group, then SIGKILL if it hasn't
/// exited within [`KILL_GRACE_PERIOD`].
async fn terminate(pid: Option<i32>) {
    let Some(pid) = pid else { return };
    let pgid = Pid::from_raw(pid);
    if signal::killpg(pgid, Signal::SIGTERM).is_err() {
        return;
    }
    tokio::time::sleep(KILL_GRACE_PERIOD).await;
    let _ = signal::killpg(pgid, Signal::SIGKILL);
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
