// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The print backend seam.

use std::path::Path;

use async_trait::async_trait;

use printlink_core::error::{PrintlinkError, Result};
use printlink_core::PrinterInfo;

/// Enumerates installed printers and transmits jobs to them.
///
/// Every send takes the resolved `PrinterInfo` so transports can route on
/// the device URI without enumerating again.
#[async_trait]
pub trait PrintBackend: Send + Sync {
    /// All printers currently visible to the host.
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>>;

    /// Look a printer up by display name or stable id.
    async fn resolve(&self, id_or_name: &str) -> Result<PrinterInfo> {
        let printers = self.list_printers().await?;
        resolve_in(&printers, id_or_name)
    }

    /// Send bytes the printer interprets natively.
    async fn send_raw(&self, printer: &PrinterInfo, data: &[u8]) -> Result<()>;

    /// Send UTF-8 text as a raw job.
    async fn send_text(&self, printer: &PrinterInfo, text: &str) -> Result<()>;

    /// Print a document file through the system driver.
    async fn send_file(&self, printer: &PrinterInfo, path: &Path) -> Result<()>;
}

/// Exact name match wins over id match.
pub fn resolve_in(printers: &[PrinterInfo], id_or_name: &str) -> Result<PrinterInfo> {
    printers
        .iter()
        .find(|p| p.name == id_or_name)
        .or_else(|| printers.iter().find(|p| p.id == id_or_name))
        .cloned()
        .ok_or_else(|| PrintlinkError::PrinterNotFound(id_or_name.to_string()))
}
