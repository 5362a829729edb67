// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS print backend.
//
// Printers are enumerated with `lpstat` and jobs submitted with `lp`, so the
// backend works against any CUPS (or CUPS-compatible) spooler without
// linking libcups.  Queues whose device URI is `socket://` bypass the
// spooler for raw jobs and are written over TCP directly.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use printlink_core::PrinterInfo;
use printlink_core::error::{PrintlinkError, Result};

use crate::backend::PrintBackend;
use crate::printer_id::printer_id;
use crate::raw_client;

// ---------------------------------------------------------------------------
// Status bits
// ---------------------------------------------------------------------------

/// Printer is paused / not accepting output.
pub const STATUS_PAUSED: u32 = 0x0000_0001;

/// Printer is processing a job.
pub const STATUS_PRINTING: u32 = 0x0000_0400;

/// Attribute bit marking the system default destination.
pub const ATTRIBUTE_DEFAULT: u32 = 0x0000_0004;

/// Job title for text submissions.
const TEXT_JOB_TITLE: &str = "TextJob";

/// Job title for raw submissions.
const RAW_JOB_TITLE: &str = "RawPrintJob";

/// `lpstat` stderr when the host has no queues at all.
const NO_DESTINATIONS: &str = "No destinations added";

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Print backend that drives the CUPS command-line tools.
#[derive(Debug, Clone)]
pub struct CupsBackend {
    lpstat: String,
    lp: String,
}

impl Default for CupsBackend {
    fn default() -> Self {
        Self {
            lpstat: "lpstat".into(),
            lp: "lp".into(),
        }
    }
}

impl CupsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use alternative `lpstat` / `lp` programs.
    pub fn with_programs(lpstat: impl Into<String>, lp: impl Into<String>) -> Self {
        Self {
            lpstat: lpstat.into(),
            lp: lp.into(),
        }
    }

    /// Run `lpstat` with the given arguments and return stdout.
    async fn lpstat(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.lpstat)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| PrintlinkError::Print(format!("{}: {e}", self.lpstat)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            if stderr.contains(NO_DESTINATIONS) {
                return Ok(String::new());
            }
            return Err(PrintlinkError::Print(format!(
                "lpstat {}: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Submit a job through `lp`, feeding `stdin_data` when given.
    async fn lp(&self, args: &[&str], stdin_data: Option<&[u8]>) -> Result<()> {
        let mut child = Command::new(&self.lp)
            .args(args)
            .stdin(if stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PrintlinkError::Print(format!("{}: {e}", self.lp)))?;

        if let (Some(data), Some(mut stdin)) = (stdin_data, child.stdin.take()) {
            stdin
                .write_all(data)
                .await
                .map_err(|e| PrintlinkError::Print(format!("write to lp: {e}")))?;
            // Closing stdin ends the job.
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PrintlinkError::Print(format!("wait for lp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrintlinkError::Print(stderr.trim().to_string()));
        }
        debug!(
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "lp accepted job"
        );
        Ok(())
    }

    /// Raw bytes go straight to `socket://` queues, otherwise through `lp -o raw`.
    async fn submit_raw(&self, printer: &PrinterInfo, data: &[u8], title: &str) -> Result<()> {
        if let Some((host, port)) = raw_client::parse_socket_uri(&printer.port_name) {
            return raw_client::send_raw(&host, port, data).await;
        }
        self.lp(
            &["-d", &printer.name, "-o", "raw", "-t", title],
            Some(data),
        )
        .await
    }
}

#[async_trait]
impl PrintBackend for CupsBackend {
    #[instrument(skip(self))]
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>> {
        let (long, devices, default) = tokio::try_join!(
            self.lpstat(&["-l", "-p"]),
            self.lpstat(&["-v"]),
            self.lpstat(&["-d"]),
        )?;

        let printers = build_printers(
            parse_queues(&long),
            &parse_devices(&devices),
            parse_default(&default).as_deref(),
        );
        debug!(count = printers.len(), "enumerated printers");
        Ok(printers)
    }

    #[instrument(skip(self, data), fields(printer = %printer.name, bytes = data.len()))]
    async fn send_raw(&self, printer: &PrinterInfo, data: &[u8]) -> Result<()> {
        self.submit_raw(printer, data, RAW_JOB_TITLE).await?;
        info!("raw job submitted");
        Ok(())
    }

    #[instrument(skip(self, text), fields(printer = %printer.name, bytes = text.len()))]
    async fn send_text(&self, printer: &PrinterInfo, text: &str) -> Result<()> {
        self.submit_raw(printer, text.as_bytes(), TEXT_JOB_TITLE).await?;
        info!("text job submitted");
        Ok(())
    }

    #[instrument(skip(self), fields(printer = %printer.name, path = %path.display()))]
    async fn send_file(&self, printer: &PrinterInfo, path: &Path) -> Result<()> {
        let path_arg = path.to_string_lossy();
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_arg.to_string());

        self.lp(&["-d", &printer.name, "-t", &title, &path_arg], None)
            .await?;
        info!("document job submitted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// lpstat parsing
// ---------------------------------------------------------------------------

/// One queue from `lpstat -l -p`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queue {
    pub name: String,
    pub status: u32,
    pub description: String,
    pub location: String,
    pub interface: String,
}

/// Parse `lpstat -l -p` output.
///
/// Queue header lines start with `printer NAME`; detail lines are indented
/// `Key: value` pairs belonging to the preceding header.
pub fn parse_queues(output: &str) -> Vec<Queue> {
    let mut queues: Vec<Queue> = Vec::new();

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("printer ") {
            let mut words = rest.split_whitespace();
            let Some(name) = words.next() else {
                continue;
            };
            let state = words.collect::<Vec<_>>().join(" ");
            queues.push(Queue {
                name: name.to_string(),
                status: status_bits(&state),
                ..Queue::default()
            });
            continue;
        }

        let Some(current) = queues.last_mut() else {
            continue;
        };
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key {
            "Description" => current.description = value,
            "Location" => current.location = value,
            "Interface" => current.interface = value,
            _ => {}
        }
    }
    queues
}

fn status_bits(state: &str) -> u32 {
    let mut status = 0;
    if state.contains("disabled") {
        status |= STATUS_PAUSED;
    }
    if state.contains("now printing") {
        status |= STATUS_PRINTING;
    }
    status
}

/// Parse `lpstat -v` output into queue name -> device URI.
pub fn parse_devices(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix("device for ")?;
            let (name, uri) = rest.split_once(": ")?;
            Some((name.trim().to_string(), uri.trim().to_string()))
        })
        .collect()
}

/// Parse `lpstat -d` output.
pub fn parse_default(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.strip_prefix("system default destination: ")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    })
}

/// Driver label for a queue: the PPD / interface file stem, or `raw`.
fn driver_name(queue: &Queue) -> String {
    Path::new(&queue.interface)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "raw".to_string())
}

/// Combine the three `lpstat` views into printer descriptors.
pub fn build_printers(
    queues: Vec<Queue>,
    devices: &HashMap<String, String>,
    default: Option<&str>,
) -> Vec<PrinterInfo> {
    queues
        .into_iter()
        .map(|queue| {
            let port_name = devices.get(&queue.name).cloned().unwrap_or_default();
            if port_name.is_empty() {
                warn!(printer = %queue.name, "queue has no device URI");
            }
            let driver_name = driver_name(&queue);
            let is_default = default == Some(queue.name.as_str());

            PrinterInfo {
                id: printer_id(&queue.name, &port_name, &driver_name),
                share_name: queue.name.clone(),
                name: queue.name,
                port_name,
                driver_name,
                location: queue.location,
                comment: queue.description,
                status: queue.status,
                attributes: if is_default { ATTRIBUTE_DEFAULT } else { 0 },
                is_default,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LPSTAT_LP: &str = "\
printer Office is idle.  enabled since Tue 14 Oct 2025 09:12:01
\tForm mounted:
\tContent types: any
\tDescription: Office Laser
\tAlerts: none
\tLocation: 2nd floor
\tConnection: direct
\tInterface: /etc/cups/ppd/Office.ppd
printer Receipt now printing Receipt-42.  enabled since Tue 14 Oct 2025 09:15:30
\tDescription: Front desk TM-T20
\tLocation:
\tConnection: direct
printer Archive disabled since Mon 13 Oct 2025 17:00:00 -
\treason unknown
\tDescription: Old inkjet
";

    const LPSTAT_V: &str = "\
device for Office: ipp://10.0.0.5/ipp/print
device for Receipt: socket://10.0.0.9:9100
device for Archive: usb://Canon/iP4950
";

    #[test]
    fn parses_queue_headers_and_details() {
        let queues = parse_queues(LPSTAT_LP);
        assert_eq!(queues.len(), 3);

        assert_eq!(queues[0].name, "Office");
        assert_eq!(queues[0].status, 0);
        assert_eq!(queues[0].description, "Office Laser");
        assert_eq!(queues[0].location, "2nd floor");
        assert_eq!(queues[0].interface, "/etc/cups/ppd/Office.ppd");

        assert_eq!(queues[1].status, STATUS_PRINTING);
        assert_eq!(queues[1].location, "");
        assert_eq!(queues[2].status, STATUS_PAUSED);
    }

    #[test]
    fn parses_devices_and_default() {
        let devices = parse_devices(LPSTAT_V);
        assert_eq!(devices["Receipt"], "socket://10.0.0.9:9100");
        assert_eq!(devices.len(), 3);

        assert_eq!(
            parse_default("system default destination: Receipt\n").as_deref(),
            Some("Receipt")
        );
        assert_eq!(parse_default("no system default destination\n"), None);
    }

    #[test]
    fn builds_descriptors() {
        let printers = build_printers(
            parse_queues(LPSTAT_LP),
            &parse_devices(LPSTAT_V),
            Some("Receipt"),
        );

        let office = &printers[0];
        assert_eq!(office.driver_name, "Office");
        assert_eq!(office.comment, "Office Laser");
        assert!(!office.is_default);
        assert_eq!(
            office.id,
            printer_id("Office", "ipp://10.0.0.5/ipp/print", "Office")
        );

        let receipt = &printers[1];
        assert_eq!(receipt.driver_name, "raw");
        assert_eq!(receipt.port_name, "socket://10.0.0.9:9100");
        assert_eq!(receipt.share_name, "Receipt");
        assert!(receipt.is_default);
        assert_eq!(receipt.attributes, ATTRIBUTE_DEFAULT);
    }

    #[test]
    fn empty_output_means_no_printers() {
        assert!(build_printers(parse_queues(""), &HashMap::new(), None).is_empty());
    }

    #[tokio::test]
    async fn missing_lpstat_is_print_error() {
        let backend = CupsBackend::with_programs("/nonexistent/lpstat", "/nonexistent/lp");
        let err = backend.list_printers().await.unwrap_err();
        assert!(matches!(err, PrintlinkError::Print(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn lp_failure_carries_driver_message() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let lp = dir.path().join("lp");
        std::fs::write(
            &lp,
            "#!/bin/sh\ncat >/dev/null\necho 'lp: The printer or class does not exist.' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&lp, std::fs::Permissions::from_mode(0o755)).unwrap();

        let backend = CupsBackend::with_programs("lpstat", lp.to_string_lossy());
        let printer = crate::memory::MemoryBackend::printer("Ghost", "usb://x", "raw");
        let err = backend.send_text(&printer, "hello").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "print failed: lp: The printer or class does not exist."
        );
    }
}
