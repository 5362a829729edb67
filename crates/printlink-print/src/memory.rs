// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process print backend.
//
// Records submitted jobs instead of printing them.  Selected with
// `--backend memory` to exercise the HTTP API on hosts without a spooler,
// and used by the test suites.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::warn;

use printlink_core::PrinterInfo;
use printlink_core::error::{PrintlinkError, Result};

use crate::backend::PrintBackend;
use crate::printer_id::printer_id;

/// A job captured by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedJob {
    Raw { printer: String, data: Vec<u8> },
    Text { printer: String, text: String },
    /// File contents are captured at submit time; the file itself may be
    /// removed later.
    File { printer: String, suffix: String, data: Vec<u8> },
}

/// Backend with a fixed printer list that records every job.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    printers: Vec<PrinterInfo>,
    jobs: Mutex<Vec<RecordedJob>>,
    failure: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new(printers: Vec<PrinterInfo>) -> Self {
        Self {
            printers,
            ..Self::default()
        }
    }

    /// Build a printer descriptor with its derived id.
    pub fn printer(name: &str, port: &str, driver: &str) -> PrinterInfo {
        PrinterInfo {
            id: printer_id(name, port, driver),
            name: name.to_string(),
            port_name: port.to_string(),
            driver_name: driver.to_string(),
            location: String::new(),
            comment: String::new(),
            share_name: name.to_string(),
            status: 0,
            attributes: 0,
            is_default: false,
        }
    }

    /// Make every subsequent send fail with `message` (or succeed again with `None`).
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = message.map(str::to_string);
    }

    /// Jobs recorded so far, oldest first.
    pub fn jobs(&self) -> Vec<RecordedJob> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, job: RecordedJob) -> Result<()> {
        if let Some(message) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            warn!(error = %message, "memory backend rejecting job");
            return Err(PrintlinkError::Print(message));
        }
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job);
        Ok(())
    }
}

#[async_trait]
impl PrintBackend for MemoryBackend {
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>> {
        Ok(self.printers.clone())
    }

    async fn send_raw(&self, printer: &PrinterInfo, data: &[u8]) -> Result<()> {
        self.record(RecordedJob::Raw {
            printer: printer.name.clone(),
            data: data.to_vec(),
        })
    }

    async fn send_text(&self, printer: &PrinterInfo, text: &str) -> Result<()> {
        self.record(RecordedJob::Text {
            printer: printer.name.clone(),
            text: text.to_string(),
        })
    }

    async fn send_file(&self, printer: &PrinterInfo, path: &Path) -> Result<()> {
        let data = tokio::fs::read(path).await?;
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        self.record(RecordedJob::File {
            printer: printer.name.clone(),
            suffix,
            data,
        })
    }
}
