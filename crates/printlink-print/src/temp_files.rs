// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temporary files for document jobs.  The print spooler may read the file
// after `lp` returns, so removal is deferred by a fixed delay instead of
// happening when the job call completes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use printlink_core::error::{PrintlinkError, Result};

/// Write bytes to a new temp file that outlives this call.
pub fn write_temp(data: &[u8], suffix: &str) -> Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("printlink-")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(data)?;
    file.flush()?;

    let (_, path) = file
        .keep()
        .map_err(|e| PrintlinkError::Io(e.error))?;
    debug!(path = %path.display(), bytes = data.len(), "temp file written");
    Ok(path)
}

/// Delete `path` after `ttl`.  Failures are ignored.
pub fn schedule_removal(path: impl AsRef<Path>, ttl: Duration) {
    let path = path.as_ref().to_path_buf();
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "temp file removed"),
            Err(e) => debug!(path = %path.display(), error = %e, "temp file removal skipped"),
        }
    });
}
