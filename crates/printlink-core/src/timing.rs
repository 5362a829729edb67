// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed scheduling intervals for the supervisor and temp-file cleanup.

use std::time::Duration;

/// Intervals used by the worker supervisor and the print pipeline.
///
/// Production uses the defaults; tests shrink them to milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorTimings {
    /// Monitoring poll interval while the worker runs.
    pub tick: Duration,
    /// How long a terminated worker gets before it is force-killed.
    pub grace_period: Duration,
    /// Delay before relaunching after a crash or launch failure.
    pub backoff: Duration,
    /// Re-poll interval while waiting for configuration.
    pub config_poll: Duration,
    /// How long temporary print files live before removal.
    pub temp_file_ttl: Duration,
    /// Delay between answering `/shutdown` and tearing down.
    pub shutdown_delay: Duration,
}

impl Default for SupervisorTimings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            grace_period: Duration::from_secs(5),
            backoff: Duration::from_secs(5),
            config_poll: Duration::from_secs(5),
            temp_file_ttl: Duration::from_secs(60),
            shutdown_delay: Duration::from_secs(1),
        }
    }
}

impl SupervisorTimings {
    /// Every interval set to `unit`, except the grace period which is a few
    /// ticks so a polite worker has time to exit.
    pub fn scaled(unit: Duration) -> Self {
        Self {
            tick: unit,
            grace_period: unit * 5,
            backoff: unit * 5,
            config_poll: unit * 5,
            temp_file_ttl: unit * 60,
            shutdown_delay: unit,
        }
    }

    /// Upper bound for a full supervisor teardown: terminate, grace period,
    /// force-kill, and one tick of slack.
    pub fn teardown_bound(&self) -> Duration {
        self.grace_period * 2 + self.tick
    }
}
