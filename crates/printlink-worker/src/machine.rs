// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supervisor state transitions.
//
// `next_state` is total: every (state, event) pair has an answer, and pairs
// that make no sense for a state leave it where it is.

use printlink_core::WorkerState;

/// Something the supervisor observed while in a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The shutdown flag is set.
    Shutdown,
    /// Configuration has auto-start turned off.
    AutoStartOff,
    /// Auto-start is on but a required setting is missing.
    Incomplete,
    /// Auto-start is on and configuration is complete.
    Ready,
    /// The worker process was spawned.
    Spawned,
    /// Spawning failed with an OS error.
    LaunchFailed,
    /// No executable exists at any candidate location.
    ExecutableMissing,
    /// A restart was requested while the worker ran.
    RestartRequested,
    /// The worker exited on its own.
    Exited,
}

pub fn next_state(state: WorkerState, event: Event) -> WorkerState {
    use Event as E;
    use WorkerState as S;

    match (state, event) {
        (S::Stopped, _) | (_, E::Shutdown) => S::Stopped,

        // Evaluation outcomes, valid wherever the supervisor re-reads config.
        (S::Disabled | S::AwaitingConfig | S::Restarting, E::AutoStartOff) => S::Disabled,
        (S::Disabled | S::AwaitingConfig | S::Restarting, E::Incomplete) => S::AwaitingConfig,
        (S::Disabled | S::AwaitingConfig | S::Restarting, E::Ready) => S::Launching,
        (
            S::Disabled | S::AwaitingConfig | S::Restarting | S::Launching,
            E::ExecutableMissing,
        ) => S::Disabled,

        (S::Launching, E::Spawned) => S::Running,
        (S::Launching, E::LaunchFailed) => S::Restarting,

        (S::Running, E::RestartRequested | E::AutoStartOff | E::Exited) => S::Restarting,

        (state, _) => state,
    }
}
