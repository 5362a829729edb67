// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The live worker child process.
//
// A `WorkerProcess` is owned by the supervisor for exactly one launch.
// Dropping it kills the child, so an aborted supervisor task cannot leave
// an orphan behind.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use printlink_core::error::{PrintlinkError, Result};

use crate::status::{StatusRegister, StatusUpdate};

/// Windows `CREATE_NO_WINDOW`: no console for the worker.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug)]
pub struct WorkerProcess {
    child: Child,
    pid: Option<u32>,
}

impl WorkerProcess {
    /// Start `program` with `args`.  Its stdout and stderr lines are
    /// appended to `status` as they arrive.
    pub fn spawn(program: &Path, args: &[String], status: Arc<StatusRegister>) -> std::io::Result<Self> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command.spawn()?;
        let pid = child.id();

        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, status.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, status);
        }

        Ok(Self { child, pid })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking exit check.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        self.child
            .try_wait()
            .map_err(|e| PrintlinkError::Process(format!("poll worker: {e}")))
    }

    /// Ask the worker to exit, wait up to `grace`, then force-kill.
    ///
    /// A worker that already exited is not an error.
    pub async fn shutdown(mut self, grace: Duration) -> Option<ExitStatus> {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!(pid = ?self.pid, %status, "worker already exited");
            return Some(status);
        }

        if let Err(e) = self.terminate() {
            warn!(pid = ?self.pid, error = %e, "terminate failed, killing");
        } else {
            match tokio::time::timeout(grace, self.child.wait()).await {
                Ok(Ok(status)) => {
                    info!(pid = ?self.pid, %status, "worker stopped");
                    return Some(status);
                }
                Ok(Err(e)) => warn!(pid = ?self.pid, error = %e, "wait for worker failed"),
                Err(_) => warn!(
                    pid = ?self.pid,
                    grace_ms = grace.as_millis() as u64,
                    "worker ignored terminate, killing"
                ),
            }
        }

        if let Err(e) = self.child.start_kill() {
            debug!(pid = ?self.pid, error = %e, "kill failed");
        }
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(pid = ?self.pid, %status, "worker force stopped");
                Some(status)
            }
            _ => {
                warn!(pid = ?self.pid, "worker did not exit after kill");
                None
            }
        }
    }

    /// Polite stop request: SIGTERM on unix.
    #[cfg(unix)]
    fn terminate(&mut self) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        // `id()` is `None` once the child has been reaped.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let pid = i32::try_from(pid)
            .map_err(|_| PrintlinkError::Process(format!("pid {pid} out of range")))?;
        match kill(Pid::from_raw(pid), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(PrintlinkError::Process(format!("SIGTERM {pid}: {e}"))),
        }
    }

    /// Windows has no polite signal for a console-less child.
    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<()> {
        self.child
            .start_kill()
            .map_err(|e| PrintlinkError::Process(format!("terminate worker: {e}")))
    }
}

/// Append each line read from `stream` to the status output history.
fn forward_lines<R>(stream: R, status: Arc<StatusRegister>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    debug!(target: "printlink::worker_output", "{line}");
                    status.update(StatusUpdate::new().output(line));
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(error = %e, "worker output stream closed");
                    break;
                }
            }
        }
    });
}
