// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Printlink.

use thiserror::Error;

/// Top-level error type for all Printlink operations.
#[derive(Debug, Error)]
pub enum PrintlinkError {
    // -- Worker supervision --
    #[error("configuration incomplete: missing {0}")]
    ConfigIncomplete(String),

    #[error("executable not found")]
    ExecutableNotFound,

    #[error("Error running vortex: {0}")]
    Launch(String),

    #[error("{}", describe_exit(.code))]
    UnexpectedExit { code: Option<i32> },

    #[error("process control failed: {0}")]
    Process(String),

    // -- Print backend --
    #[error("printer not found: {0}")]
    PrinterNotFound(String),

    #[error("print failed: {0}")]
    Print(String),

    // -- Payloads --
    #[error("{0}")]
    InvalidPayload(String),

    #[error("download failed: {0}")]
    Fetch(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Render a worker exit the way the status page reports it.
fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("vortex exited with code {code}"),
        None => "vortex terminated by signal".to_string(),
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_messages_carry_code() {
        let err = PrintlinkError::UnexpectedExit { code: Some(3) };
        assert_eq!(err.to_string(), "vortex exited with code 3");

        let err = PrintlinkError::UnexpectedExit { code: None };
        assert_eq!(err.to_string(), "vortex terminated by signal");
    }

    #[test]
    fn invalid_payload_is_shown_verbatim() {
        let err = PrintlinkError::InvalidPayload("Invalid mode".into());
        assert_eq!(err.to_string(), "Invalid mode");
    }
}
