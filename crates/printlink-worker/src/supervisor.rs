// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The worker supervisor loop.
//
// One background task owns the worker process for its whole life.  Each
// state has a step that runs until something happens, reports that as an
// `Event`, and `next_state` decides where to go.  Every error is recorded
// in the status register; nothing here ends the task except shutdown.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use printlink_core::error::PrintlinkError;
use printlink_core::{SupervisorTimings, WorkerState, WorkerStatus};
use printlink_store::ConfigStore;

use crate::discovery::ExecutableLocator;
use crate::flags::{ControlFlags, Wake};
use crate::launch::{WORKER_SECRET, display_args, worker_args};
use crate::machine::{Event, next_state};
use crate::process::WorkerProcess;
use crate::status::{StatusRegister, StatusUpdate};

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

const DISABLED_MESSAGE: &str = "Vortex startup disabled";
const WAITING_MESSAGE: &str = "Waiting for configuration";
const CONFIG_CHANGED_MESSAGE: &str = "Restarting due to config change";
const STOPPED_BY_CONFIG_MESSAGE: &str = "Stopped by configuration";
const STOPPED_BY_USER_MESSAGE: &str = "stopped by user";

/// Why the supervisor is in `Restarting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestartCause {
    /// Configuration was saved.
    ConfigChange,
    /// Auto-start was switched off.
    Disabled,
    /// The worker exited on its own.
    Crashed,
    /// Spawning the worker failed.
    LaunchFailed,
}

impl RestartCause {
    /// Only failures wait before relaunching.
    fn backs_off(self) -> bool {
        matches!(self, Self::Crashed | Self::LaunchFailed)
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

pub struct Supervisor {
    store: Arc<dyn ConfigStore>,
    status: Arc<StatusRegister>,
    flags: Arc<ControlFlags>,
    locator: ExecutableLocator,
    timings: SupervisorTimings,
    secret: String,
    worker: Option<WorkerProcess>,
    /// Set when no executable was found; cleared by the next restart request.
    executable_missing: bool,
    restart_cause: RestartCause,
}

impl Supervisor {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        locator: ExecutableLocator,
        timings: SupervisorTimings,
    ) -> Self {
        Self {
            store,
            status: Arc::new(StatusRegister::new()),
            flags: Arc::new(ControlFlags::new()),
            locator,
            timings,
            secret: WORKER_SECRET.to_string(),
            worker: None,
            executable_missing: false,
            restart_cause: RestartCause::ConfigChange,
        }
    }

    /// Override the worker secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Run the loop on the current runtime.
    pub fn spawn(self) -> SupervisorHandle {
        let status = self.status.clone();
        let flags = self.flags.clone();
        let timings = self.timings;
        let task = tokio::spawn(self.run());
        SupervisorHandle {
            status,
            flags,
            timings,
            task: Mutex::new(Some(task)),
        }
    }

    #[instrument(skip_all, name = "supervisor")]
    pub async fn run(mut self) {
        info!(
            candidates = self.locator.candidates().len(),
            "worker supervisor started"
        );

        let mut state = next_state(WorkerState::Disabled, self.evaluate());
        self.enter(WorkerState::Disabled, state);

        while state != WorkerState::Stopped {
            let event = match state {
                WorkerState::Disabled => self.idle().await,
                WorkerState::AwaitingConfig => self.idle().await,
                WorkerState::Launching => self.launch().await,
                WorkerState::Running => self.monitor().await,
                WorkerState::Restarting => self.restart().await,
                WorkerState::Stopped => Event::Shutdown,
            };
            let next = next_state(state, event);
            if next != state {
                info!(from = %state, to = %next, ?event, "worker state changed");
                self.enter(state, next);
                state = next;
            }
        }

        if let Some(worker) = self.worker.take() {
            worker.shutdown(self.timings.grace_period).await;
        }
        self.status
            .update(StatusUpdate::new().running(false).pid(None));
        info!("worker supervisor stopped");
    }

    /// Status bookkeeping on moving from `from` to `state`.
    fn enter(&self, from: WorkerState, state: WorkerState) {
        let mut update = StatusUpdate::new().state(state);
        match state {
            // The latch already reported "executable not found".
            WorkerState::Disabled if self.executable_missing => {}
            WorkerState::Disabled if from == WorkerState::Restarting => {
                info!("worker stopped by configuration");
                update = update.running(false).error(STOPPED_BY_CONFIG_MESSAGE);
            }
            WorkerState::Disabled => {
                info!("worker startup disabled");
                update = update.running(false).error(DISABLED_MESSAGE);
            }
            WorkerState::AwaitingConfig => {
                let missing = self.store.get().missing_fields().join(", ");
                warn!(
                    error = %PrintlinkError::ConfigIncomplete(missing),
                    "waiting for configuration, open /config to finish setup"
                );
                update = update.running(false).error(WAITING_MESSAGE);
            }
            _ => {}
        }
        self.status.update(update);
    }

    /// Read flags and configuration and say what should happen next.
    fn evaluate(&mut self) -> Event {
        if self.flags.is_shutdown() {
            return Event::Shutdown;
        }
        // A save is the operator's cue that the executable may be in place now.
        let latch_cleared = self.flags.take_restart() && std::mem::take(&mut self.executable_missing);

        let config = self.store.get();
        let event = if !config.auto_start() {
            Event::AutoStartOff
        } else if !config.is_complete() {
            Event::Incomplete
        } else if self.executable_missing {
            Event::ExecutableMissing
        } else {
            Event::Ready
        };

        // Disabled -> Disabled has no `enter`, so replace the stale latch message here.
        if latch_cleared && event == Event::AutoStartOff {
            info!("worker startup disabled");
            self.status
                .update(StatusUpdate::new().running(false).error(DISABLED_MESSAGE));
        }
        event
    }

    /// `Disabled` / `AwaitingConfig`: re-poll configuration.
    async fn idle(&mut self) -> Event {
        if self.flags.sleep(self.timings.config_poll).await == Wake::Shutdown {
            return Event::Shutdown;
        }
        self.evaluate()
    }

    async fn launch(&mut self) -> Event {
        self.flags.take_restart();
        let config = self.store.get();

        let Some(path) = self.locator.locate() else {
            error!(
                searched = ?self.locator.candidates(),
                "worker executable not found, control surface stays up"
            );
            self.executable_missing = true;
            self.status.update(
                StatusUpdate::new()
                    .running(false)
                    .pid(None)
                    .error(PrintlinkError::ExecutableNotFound.to_string()),
            );
            return Event::ExecutableMissing;
        };

        let args = worker_args(&config, &self.secret);
        info!(
            path = %path.display(),
            args = %display_args(&args),
            "launching worker"
        );

        match WorkerProcess::spawn(&path, &args, self.status.clone()) {
            Ok(worker) => {
                info!(pid = ?worker.pid(), "worker started");
                self.status.update(
                    StatusUpdate::new()
                        .running(true)
                        .pid(worker.pid())
                        .clear_error(),
                );
                self.worker = Some(worker);
                Event::Spawned
            }
            Err(e) => {
                let err = PrintlinkError::Launch(e.to_string());
                error!(error = %err, "worker launch failed");
                self.status
                    .update(StatusUpdate::new().running(false).error(err.to_string()));
                self.restart_cause = RestartCause::LaunchFailed;
                Event::LaunchFailed
            }
        }
    }

    /// `Running`: one check per tick, in priority order.
    async fn monitor(&mut self) -> Event {
        loop {
            if self.flags.is_shutdown() {
                return Event::Shutdown;
            }

            if self.flags.restart_requested() {
                info!("configuration changed, restarting worker");
                self.status.update(
                    StatusUpdate::new()
                        .running(false)
                        .error(CONFIG_CHANGED_MESSAGE),
                );
                self.restart_cause = RestartCause::ConfigChange;
                return Event::RestartRequested;
            }

            if !self.store.auto_start_enabled() {
                info!("worker disabled in configuration, stopping");
                self.status.update(
                    StatusUpdate::new()
                        .running(false)
                        .error(STOPPED_BY_CONFIG_MESSAGE),
                );
                self.restart_cause = RestartCause::Disabled;
                return Event::AutoStartOff;
            }

            let exited = match self.worker.as_mut() {
                Some(worker) => match worker.try_wait() {
                    Ok(Some(status)) => Some(status.code()),
                    Ok(None) => None,
                    Err(e) => {
                        warn!(error = %e, "could not poll worker");
                        None
                    }
                },
                // Nothing to monitor; treat like an exit so it gets relaunched.
                None => Some(None),
            };
            if let Some(code) = exited {
                let err = PrintlinkError::UnexpectedExit { code };
                warn!(error = %err, "worker exited");
                self.status
                    .update(StatusUpdate::new().running(false).error(err.to_string()));
                self.restart_cause = RestartCause::Crashed;
                return Event::Exited;
            }

            if self.flags.sleep(self.timings.tick).await == Wake::Shutdown {
                return Event::Shutdown;
            }
        }
    }

    /// `Restarting`: tear down, back off after failures, re-evaluate.
    async fn restart(&mut self) -> Event {
        if let Some(worker) = self.worker.take() {
            worker.shutdown(self.timings.grace_period).await;
        }
        self.status
            .update(StatusUpdate::new().running(false).pid(None));

        let cause = self.restart_cause;
        if cause.backs_off() && self.store.auto_start_enabled() && !self.flags.restart_requested() {
            info!(
                ?cause,
                delay_ms = self.timings.backoff.as_millis() as u64,
                "relaunching worker after backoff"
            );
            if self.flags.sleep(self.timings.backoff).await == Wake::Shutdown {
                return Event::Shutdown;
            }
        } else {
            debug!(?cause, "relaunching worker without backoff");
        }
        self.evaluate()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// What the rest of the process holds to talk to a running supervisor.
pub struct SupervisorHandle {
    status: Arc<StatusRegister>,
    flags: Arc<ControlFlags>,
    timings: SupervisorTimings,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SupervisorHandle {
    pub fn status(&self) -> WorkerStatus {
        self.status.snapshot()
    }

    /// Relaunch the worker with the current configuration.  Never blocks.
    pub fn request_restart(&self) {
        self.flags.request_restart();
    }

    pub fn is_shutdown(&self) -> bool {
        self.flags.is_shutdown()
    }

    /// Stop the supervisor and its worker.
    ///
    /// Safe to call any number of times from any task; later callers wait
    /// for the first one to finish.  Bounded by the timings' teardown bound.
    pub async fn shutdown(&self) {
        let first = self.flags.request_shutdown();
        let mut slot = self.task.lock().await;

        if let Some(mut task) = slot.take() {
            match tokio::time::timeout(self.timings.teardown_bound(), &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "supervisor task failed"),
                Err(_) => {
                    warn!("supervisor did not stop in time, aborting");
                    // Dropping the task kills the worker.
                    task.abort();
                }
            }
        }

        if first {
            self.status.update(
                StatusUpdate::new()
                    .running(false)
                    .pid(None)
                    .error(STOPPED_BY_USER_MESSAGE)
                    .state(WorkerState::Stopped),
            );
            info!("services stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, Instant};

    use printlink_core::WorkerConfig;
    use printlink_store::MemoryConfigStore;
    use serde_json::json;

    fn timings() -> SupervisorTimings {
        SupervisorTimings::scaled(Duration::from_millis(10))
    }

    fn complete_config() -> WorkerConfig {
        WorkerConfig {
            site: "a.com".into(),
            provider: "http".into(),
            host: "0.0.0.0".into(),
            port: "9100".into(),
            email: "x@y.com".into(),
            ..WorkerConfig::default()
        }
    }

    fn start(store: Arc<MemoryConfigStore>, candidates: Vec<PathBuf>) -> SupervisorHandle {
        start_with(store, candidates, timings())
    }

    fn start_with(
        store: Arc<MemoryConfigStore>,
        candidates: Vec<PathBuf>,
        timings: SupervisorTimings,
    ) -> SupervisorHandle {
        Supervisor::new(store, ExecutableLocator::with_candidates(candidates), timings)
            .with_secret("s3cret")
            .spawn()
    }

    async fn wait_for<F: Fn(&WorkerStatus) -> bool>(handle: &SupervisorHandle, cond: F) -> WorkerStatus {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let status = handle.status();
            if cond(&status) {
                return status;
            }
            assert!(
                Instant::now() < deadline,
                "condition not met in time, last status: {status:?}"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn only_failures_back_off() {
        assert!(RestartCause::Crashed.backs_off());
        assert!(RestartCause::LaunchFailed.backs_off());
        assert!(!RestartCause::ConfigChange.backs_off());
        assert!(!RestartCause::Disabled.backs_off());
    }

    #[tokio::test]
    async fn auto_start_off_stays_disabled() {
        let mut config = complete_config();
        config.start_vortex = "false".into();
        let handle = start(Arc::new(MemoryConfigStore::with_config(config)), Vec::new());

        let status = wait_for(&handle, |s| s.last_error.is_some()).await;
        assert_eq!(status.state, WorkerState::Disabled);
        assert_eq!(status.last_error.as_deref(), Some("Vortex startup disabled"));
        assert!(!status.running);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn incomplete_config_waits() {
        let handle = start(Arc::new(MemoryConfigStore::new()), Vec::new());

        let status = wait_for(&handle, |s| s.state == WorkerState::AwaitingConfig).await;
        assert_eq!(status.last_error.as_deref(), Some("Waiting for configuration"));
        assert!(!status.running);
        assert_eq!(status.restart_count, 0);

        // Still waiting after several poll intervals.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(handle.status().state, WorkerState::AwaitingConfig);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn missing_executable_is_reported_once() {
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store, vec![PathBuf::from("/nonexistent/vortex")]);

        let status = wait_for(&handle, |s| s.state == WorkerState::Disabled).await;
        assert_eq!(status.last_error.as_deref(), Some("executable not found"));
        assert!(!status.running);
        assert_eq!(status.process_id, None);

        // No retry loop: the state and message hold.
        tokio::time::sleep(Duration::from_millis(150)).await;
        let later = handle.status();
        assert_eq!(later.state, WorkerState::Disabled);
        assert_eq!(later.last_error.as_deref(), Some("executable not found"));
        assert_eq!(later.restart_count, 0);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let handle = start(Arc::new(MemoryConfigStore::new()), Vec::new());
        handle.shutdown().await;
        handle.shutdown().await;

        let status = handle.status();
        assert!(handle.is_shutdown());
        assert_eq!(status.state, WorkerState::Stopped);
        assert_eq!(status.last_error.as_deref(), Some("stopped by user"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launches_with_config_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let worker = script(dir.path(), "vortex", "echo \"$*\"\nexec sleep 30");
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store, vec![worker]);

        let status = wait_for(&handle, |s| s.running && !s.last_output.is_empty()).await;
        assert_eq!(status.state, WorkerState::Running);
        assert_eq!(status.restart_count, 1);
        assert!(status.process_id.is_some());
        assert!(status.last_start.is_some());
        assert_eq!(status.last_error, None);
        assert_eq!(
            status.last_output[0],
            "--site a.com --provider http --host 0.0.0.0 --port 9100 --email x@y.com --password s3cret"
        );

        handle.shutdown().await;
        let status = handle.status();
        assert!(!status.running);
        assert_eq!(status.process_id, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn config_save_restarts_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let worker = script(dir.path(), "vortex", "exec sleep 30");
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store.clone(), vec![worker]);

        let first = wait_for(&handle, |s| s.running).await;
        let updates = json!({ "site": "b.com" });
        store.set(updates.as_object().unwrap()).unwrap();
        handle.request_restart();

        let second = wait_for(&handle, |s| s.running && s.restart_count == 2).await;
        assert_ne!(second.process_id, first.process_id);
        assert_eq!(second.last_error, None);

        // No further restarts once settled.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(handle.status().restart_count, 2);
        handle.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn crashed_worker_is_relaunched() {
        let dir = tempfile::tempdir().unwrap();
        let worker = script(dir.path(), "vortex", "sleep 0.05\nexit 3");
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        // Long enough backoff to observe the exit message before the relaunch clears it.
        let timings = SupervisorTimings {
            backoff: Duration::from_millis(300),
            ..timings()
        };
        let handle = start_with(store, vec![worker], timings);

        wait_for(&handle, |s| {
            s.last_error.as_deref() == Some("vortex exited with code 3")
        })
        .await;
        wait_for(&handle, |s| s.restart_count >= 2).await;
        handle.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn disabling_stops_worker() {
        let dir = tempfile::tempdir().unwrap();
        let worker = script(dir.path(), "vortex", "exec sleep 30");
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store.clone(), vec![worker]);

        wait_for(&handle, |s| s.running).await;
        let updates = json!({ "start_vortex": false });
        store.set(updates.as_object().unwrap()).unwrap();

        let status = wait_for(&handle, |s| s.state == WorkerState::Disabled).await;
        assert!(!status.running);
        assert_eq!(status.process_id, None);
        assert_eq!(status.restart_count, 1);
        assert_eq!(status.last_error.as_deref(), Some("Stopped by configuration"));

        // The message holds while disabled.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(
            handle.status().last_error.as_deref(),
            Some("Stopped by configuration")
        );
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn disabling_after_missing_executable_replaces_message() {
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store.clone(), vec![PathBuf::from("/nonexistent/vortex")]);
        wait_for(&handle, |s| {
            s.last_error.as_deref() == Some("executable not found")
        })
        .await;

        let updates = json!({ "start_vortex": false });
        store.set(updates.as_object().unwrap()).unwrap();
        handle.request_restart();

        let status = wait_for(&handle, |s| {
            s.last_error.as_deref() == Some("Vortex startup disabled")
        })
        .await;
        assert_eq!(status.state, WorkerState::Disabled);
        assert!(!status.running);
        handle.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launch_failure_backs_off_and_retries() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let worker = script(dir.path(), "vortex", "exec sleep 30");
        std::fs::set_permissions(&worker, std::fs::Permissions::from_mode(0o644)).unwrap();
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store, vec![worker.clone()]);

        let status = wait_for(&handle, |s| {
            s.last_error
                .as_deref()
                .is_some_and(|e| e.starts_with("Error running vortex:"))
        })
        .await;
        assert!(matches!(
            status.state,
            WorkerState::Restarting | WorkerState::Launching
        ));
        assert!(!status.running);
        assert_eq!(status.restart_count, 0);

        // Not latched like a missing executable: the next retry picks it up.
        std::fs::set_permissions(&worker, std::fs::Permissions::from_mode(0o755)).unwrap();
        let status = wait_for(&handle, |s| s.running).await;
        assert_eq!(status.state, WorkerState::Running);
        assert_eq!(status.restart_count, 1);
        assert_eq!(status.last_error, None);
        handle.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn restart_request_retries_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vortex");
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store, vec![path.clone()]);

        wait_for(&handle, |s| {
            s.last_error.as_deref() == Some("executable not found")
        })
        .await;

        script(dir.path(), "vortex", "exec sleep 30");
        handle.request_restart();
        let status = wait_for(&handle, |s| s.running).await;
        assert_eq!(status.restart_count, 1);
        handle.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shutdown_stops_running_worker_within_bound() {
        let dir = tempfile::tempdir().unwrap();
        let worker = script(
            dir.path(),
            "vortex",
            "trap '' TERM\necho ready\nwhile :; do sleep 0.1; done",
        );
        let store = Arc::new(MemoryConfigStore::with_config(complete_config()));
        let handle = start(store, vec![worker]);
        wait_for(&handle, |s| s.running && !s.last_output.is_empty()).await;

        let started = Instant::now();
        handle.shutdown().await;
        assert!(started.elapsed() < timings().teardown_bound() + Duration::from_secs(1));

        let status = handle.status();
        assert!(!status.running);
        assert_eq!(status.state, WorkerState::Stopped);
        assert_eq!(status.last_error.as_deref(), Some("stopped by user"));
    }
}
