// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Printlink control surface.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PrintlinkError;

/// Maximum number of worker output lines kept in the status record.
pub const OUTPUT_HISTORY: usize = 50;

/// An installed printer as reported by the print backend.
///
/// Field names follow the JSON shape existing clients consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrinterInfo {
    /// Stable short identifier derived from (name, port, driver).
    pub id: String,
    pub name: String,
    pub port_name: String,
    pub driver_name: String,
    pub location: String,
    pub comment: String,
    pub share_name: String,
    /// Backend status bits (0 = ready).
    pub status: u32,
    pub attributes: u32,
    pub is_default: bool,
}

/// Payload formats accepted by `/print`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMode {
    /// UTF-8 text sent as-is.
    Text,
    /// Base64 printer-language bytes.
    Raw,
    /// PDF document (base64 or URL).
    Pdf,
    /// Image file (base64 or URL).
    Image,
    /// ESC/POS receipt with a raster logo above the text.
    LogoText,
}

impl PrintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Raw => "raw",
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::LogoText => "logo_text",
        }
    }
}

impl std::fmt::Display for PrintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintMode {
    type Err = PrintlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "raw" => Ok(Self::Raw),
            "pdf" => Ok(Self::Pdf),
            "image" => Ok(Self::Image),
            "logo_text" => Ok(Self::LogoText),
            _ => Err(PrintlinkError::InvalidPayload("Invalid mode".into())),
        }
    }
}

/// Lifecycle states of the worker supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Auto-start is off, or the executable could not be located.
    Disabled,
    /// Auto-start is on but required settings are missing.
    AwaitingConfig,
    /// Locating and spawning the executable.
    Launching,
    /// The worker process is alive and being monitored.
    Running,
    /// Tearing the current worker down before re-evaluating.
    Restarting,
    /// Shutdown requested. Terminal.
    Stopped,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::AwaitingConfig => "awaiting_config",
            Self::Launching => "launching",
            Self::Running => "running",
            Self::Restarting => "restarting",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the worker status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub running: bool,
    pub last_start: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub restart_count: u64,
    pub process_id: Option<u32>,
    /// Most recent worker output lines, oldest first.
    pub last_output: Vec<String>,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self {
            state: WorkerState::Disabled,
            running: false,
            last_start: None,
            last_error: None,
            restart_count: 0,
            process_id: None,
            last_output: Vec::new(),
        }
    }
}
