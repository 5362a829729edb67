// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line options for the control process.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use printlink_core::SupervisorTimings;
use printlink_worker::discovery::DEFAULT_WORKER_NAME;

/// Local print control surface with a supervised worker process.
#[derive(Debug, Clone, Parser)]
#[command(name = "printlink", version, about)]
pub struct Args {
    /// Address the HTTP surface listens on
    #[arg(long, default_value = "0.0.0.0:9100")]
    pub listen: SocketAddr,

    /// Directory for persistent settings
    ///
    /// Default: `$XDG_DATA_HOME/printlink` (or the platform equivalent)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Worker executable name, without platform suffix
    #[arg(long, default_value = DEFAULT_WORKER_NAME)]
    pub worker_name: String,

    /// Explicit worker executable path, searched before the standard locations
    #[arg(long)]
    pub worker_path: Option<PathBuf>,

    /// Where print jobs go
    #[arg(long, value_enum, default_value_t = BackendKind::Cups)]
    pub backend: BackendKind,

    /// Worker monitoring interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Grace period before a terminated worker is killed, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub grace_ms: u64,

    /// Delay before relaunching a crashed worker, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub backoff_ms: u64,

    /// Re-check interval while waiting for configuration, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub config_poll_ms: u64,

    /// Lifetime of temporary print files, in seconds
    #[arg(long, default_value_t = 60)]
    pub temp_ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// The system CUPS spooler (`lpstat` / `lp`)
    Cups,
    /// Record jobs in memory without printing
    Memory,
}

impl Args {
    pub fn timings(&self) -> SupervisorTimings {
        SupervisorTimings {
            tick: Duration::from_millis(self.tick_ms),
            grace_period: Duration::from_millis(self.grace_ms),
            backoff: Duration::from_millis(self.backoff_ms),
            config_poll: Duration::from_millis(self.config_poll_ms),
            temp_file_ttl: Duration::from_secs(self.temp_ttl_secs),
            ..SupervisorTimings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timings() {
        let args = Args::parse_from(["printlink"]);
        assert_eq!(args.listen, "0.0.0.0:9100".parse().unwrap());
        assert_eq!(args.worker_name, "vortex");
        assert_eq!(args.backend, BackendKind::Cups);
        assert_eq!(args.timings(), SupervisorTimings::default());
    }

    #[test]
    fn overrides_are_applied() {
        let args = Args::parse_from([
            "printlink",
            "--listen",
            "127.0.0.1:8080",
            "--worker-path",
            "/opt/vortex",
            "--backend",
            "memory",
            "--tick-ms",
            "250",
        ]);
        assert_eq!(args.listen.port(), 8080);
        assert_eq!(args.worker_path, Some(PathBuf::from("/opt/vortex")));
        assert_eq!(args.backend, BackendKind::Memory);
        assert_eq!(args.timings().tick, Duration::from_millis(250));
    }

    #[test]
    fn command_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
