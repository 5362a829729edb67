// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Restart and shutdown requests from the HTTP surface to the supervisor.
//
// Requests are plain atomic flags: setting one never blocks and never waits
// for the supervisor.  The supervisor polls them, and its sleeps are cut
// short when a flag is raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Why a supervisor sleep returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Restart,
    Shutdown,
}

#[derive(Debug, Default)]
pub struct ControlFlags {
    restart: AtomicBool,
    shutdown: AtomicBool,
    wake: Notify,
}

impl ControlFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the supervisor to relaunch the worker with fresh configuration.
    pub fn request_restart(&self) {
        self.restart.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    /// Consume a pending restart request.
    pub fn take_restart(&self) -> bool {
        self.restart.swap(false, Ordering::SeqCst)
    }

    pub fn restart_requested(&self) -> bool {
        self.restart.load(Ordering::SeqCst)
    }

    /// Returns `true` only for the first caller.
    pub fn request_shutdown(&self) -> bool {
        let first = !self.shutdown.swap(true, Ordering::SeqCst);
        self.wake.notify_waiters();
        first
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn pending(&self) -> Option<Wake> {
        if self.is_shutdown() {
            Some(Wake::Shutdown)
        } else if self.restart_requested() {
            Some(Wake::Restart)
        } else {
            None
        }
    }

    /// Sleep for `duration` unless a request is (or becomes) pending.
    pub async fn sleep(&self, duration: Duration) -> Wake {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        // Register before checking so a request raised in between still wakes us.
        notified.as_mut().enable();

        if let Some(wake) = self.pending() {
            return wake;
        }

        tokio::select! {
            _ = &mut notified => self.pending().unwrap_or(Wake::Elapsed),
            _ = tokio::time::sleep(duration) => Wake::Elapsed,
        }
    }
}
