// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The worker status record shared between the supervisor (writer) and the
// HTTP surface (readers).

use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use printlink_core::{OUTPUT_HISTORY, WorkerState, WorkerStatus};

/// A partial update.  Only the fields that were set are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct StatusUpdate {
    running: Option<bool>,
    error: Option<Option<String>>,
    pid: Option<Option<u32>>,
    output: Option<String>,
    state: Option<WorkerState>,
}

impl StatusUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting `true` also stamps `last_start` and bumps `restart_count`.
    pub fn running(mut self, running: bool) -> Self {
        self.running = Some(running);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(Some(error.into()));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    pub fn pid(mut self, pid: Option<u32>) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Append one output line.
    pub fn output(mut self, line: impl Into<String>) -> Self {
        self.output = Some(line.into());
        self
    }

    pub fn state(mut self, state: WorkerState) -> Self {
        self.state = Some(state);
        self
    }
}

/// Mutex-guarded status record.  Every update and snapshot is atomic with
/// respect to the whole record.
#[derive(Debug, Default)]
pub struct StatusRegister {
    inner: Mutex<WorkerStatus>,
}

impl StatusRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, update: StatusUpdate) {
        let mut status = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(running) = update.running {
            status.running = running;
            if running {
                status.last_start = Some(Utc::now());
                status.restart_count += 1;
            }
        }
        if let Some(error) = update.error {
            status.last_error = error;
        }
        if let Some(pid) = update.pid {
            status.process_id = pid;
        }
        if let Some(line) = update.output {
            status.last_output.push(line);
            let excess = status.last_output.len().saturating_sub(OUTPUT_HISTORY);
            if excess > 0 {
                status.last_output.drain(..excess);
            }
        }
        if let Some(state) = update.state {
            status.state = state;
        }
    }

    /// A consistent copy of the record.
    pub fn snapshot(&self) -> WorkerStatus {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn only_supplied_fields_change() {
        let register = StatusRegister::new();
        register.update(StatusUpdate::new().error("boom").pid(Some(42)));
        register.update(StatusUpdate::new().output("line"));

        let status = register.snapshot();
        assert_eq!(status.last_error.as_deref(), Some("boom"));
        assert_eq!(status.process_id, Some(42));
        assert!(!status.running);
        assert_eq!(status.restart_count, 0);
        assert_eq!(status.last_output, vec!["line".to_string()]);
    }

    #[test]
    fn running_true_stamps_start_and_counts() {
        let register = StatusRegister::new();
        register.update(StatusUpdate::new().running(true).clear_error());
        let first = register.snapshot();
        assert!(first.running);
        assert!(first.last_start.is_some());
        assert_eq!(first.restart_count, 1);

        register.update(StatusUpdate::new().running(false));
        register.update(StatusUpdate::new().running(true));
        let second = register.snapshot();
        assert_eq!(second.restart_count, 2);
        assert!(second.last_start >= first.last_start);
    }

    #[test]
    fn running_false_keeps_count() {
        let register = StatusRegister::new();
        register.update(StatusUpdate::new().running(false).error("stopped"));
        assert_eq!(register.snapshot().restart_count, 0);
        assert!(register.snapshot().last_start.is_none());
    }

    #[test]
    fn clear_error_removes_message() {
        let register = StatusRegister::new();
        register.update(StatusUpdate::new().error("x"));
        register.update(StatusUpdate::new().clear_error());
        assert!(register.snapshot().last_error.is_none());
    }

    #[test]
    fn output_keeps_last_fifty_in_order() {
        let register = StatusRegister::new();
        for i in 0..75 {
            register.update(StatusUpdate::new().output(format!("line {i}")));
        }
        let output = register.snapshot().last_output;
        assert_eq!(output.len(), OUTPUT_HISTORY);
        assert_eq!(output.first().map(String::as_str), Some("line 25"));
        assert_eq!(output.last().map(String::as_str), Some("line 74"));
    }

    #[test]
    fn concurrent_readers_never_see_torn_updates() {
        let register = Arc::new(StatusRegister::new());
        let writer = {
            let register = register.clone();
            std::thread::spawn(move || {
                for i in 0..1000u32 {
                    // pid and error always describe the same launch.
                    register.update(
                        StatusUpdate::new()
                            .pid(Some(i))
                            .error(format!("launch {i}")),
                    );
                }
            })
        };

        for _ in 0..1000 {
            let status = register.snapshot();
            if let Some(pid) = status.process_id {
                assert_eq!(status.last_error, Some(format!("launch {pid}")));
            }
        }
        writer.join().unwrap();
    }
}
