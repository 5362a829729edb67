// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job dispatch: validates a `/print` request, resolves the printer,
// decodes the payload for the requested mode and hands it to the backend.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use printlink_core::error::{PrintlinkError, Result};
use printlink_core::{PrintMode, PrinterInfo};
use printlink_document::{Payload, decode_base64, logo_receipt, raster_from_bytes};

use crate::backend::PrintBackend;
use crate::temp_files;

/// Body of `POST /print`.  Every field is optional at the wire level so
/// validation can report which rule failed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrintRequest {
    pub printer: Option<String>,
    pub mode: Option<String>,
    pub data: Option<String>,
    pub logo: Option<String>,
    pub logo_url: Option<String>,
}

/// Outcome of an accepted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintReceipt {
    /// Canonical printer name the job went to.
    pub printer: String,
    pub mode: PrintMode,
}

/// Turns print requests into backend calls.
#[derive(Clone)]
pub struct JobDispatcher {
    backend: Arc<dyn PrintBackend>,
    temp_ttl: Duration,
}

impl JobDispatcher {
    pub fn new(backend: Arc<dyn PrintBackend>, temp_ttl: Duration) -> Self {
        Self { backend, temp_ttl }
    }

    pub fn backend(&self) -> &Arc<dyn PrintBackend> {
        &self.backend
    }

    /// Validate and submit a job.
    ///
    /// Checks run in a fixed order: required fields, printer resolution,
    /// mode, then mode-specific fields.  Nothing reaches the backend until
    /// all of them pass.
    #[instrument(skip_all, fields(printer = request.printer.as_deref().unwrap_or("")))]
    pub async fn submit(&self, request: PrintRequest) -> Result<PrintReceipt> {
        let (Some(key), Some(data)) = (
            request.printer.as_deref().filter(|s| !s.is_empty()),
            request.data.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(PrintlinkError::InvalidPayload(
                "Missing printer or data".into(),
            ));
        };

        let printer = self.backend.resolve(key).await?;
        let mode: PrintMode = request.mode.as_deref().unwrap_or("text").parse()?;

        match mode {
            PrintMode::Text => self.backend.send_text(&printer, data).await?,
            PrintMode::Raw => {
                let bytes = decode_base64(data)?;
                self.backend.send_raw(&printer, &bytes).await?;
            }
            PrintMode::Pdf => self.print_document(&printer, data, ".pdf").await?,
            PrintMode::Image => self.print_document(&printer, data, ".jpg").await?,
            PrintMode::LogoText => {
                let logo = request
                    .logo
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .or(request.logo_url.as_deref().filter(|s| !s.is_empty()))
                    .ok_or_else(|| {
                        PrintlinkError::InvalidPayload("Missing 'logo' or 'logo_url'".into())
                    })?;
                let image = Payload::classify(logo).into_bytes().await?;
                let raster = raster_from_bytes(&image)?;
                self.backend
                    .send_raw(&printer, &logo_receipt(&raster, data))
                    .await?;
            }
        }

        info!(printer = %printer.name, mode = %mode, "print job accepted");
        Ok(PrintReceipt {
            printer: printer.name,
            mode,
        })
    }

    /// Materialise a document payload as a temp file and print it.  The
    /// file is scheduled for removal whether or not the print succeeds.
    async fn print_document(&self, printer: &PrinterInfo, data: &str, suffix: &str) -> Result<()> {
        let bytes = Payload::classify(data).into_bytes().await?;
        let path = temp_files::write_temp(&bytes, suffix)?;
        let result = self.backend.send_file(printer, &path).await;
        temp_files::schedule_removal(&path, self.temp_ttl);
        if let Err(ref e) = result {
            warn!(path = %path.display(), error = %e, "document print failed");
        }
        result
    }
}
