// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload decoding for print requests.
//
// A payload string is one of:
//   - an `http://` / `https://` URL, downloaded before printing
//   - a `data:<mime>;base64,<data>` URL
//   - bare base64

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use tracing::{debug, info, instrument};

use printlink_core::error::{PrintlinkError, Result};

/// Timeout for downloading remote payloads.
const FETCH_TIMEOUT_SECS: u64 = 60;

/// A classified payload string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Remote document to download.
    Remote(&'a str),
    /// Inline `data:` URL, holding the part after the comma.
    DataUrl(&'a str),
    /// Bare base64 content.
    Base64(&'a str),
}

impl<'a> Payload<'a> {
    /// Decide how a payload string should be decoded.
    pub fn classify(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Self::Remote(trimmed);
        }
        if let Some(rest) = trimmed.strip_prefix("data:") {
            // The media type is ignored; the print mode decides how bytes are used.
            if let Some((_, data)) = rest.split_once(',') {
                return Self::DataUrl(data);
            }
        }
        Self::Base64(trimmed)
    }

    /// Resolve the payload into raw bytes, downloading if necessary.
    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Remote(url) => fetch(url).await,
            Self::DataUrl(data) => decode_base64(data),
            Self::Base64(data) => decode_base64(data),
        }
    }
}

/// Decode base64, tolerating embedded whitespace and missing padding.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(compact.trim_end_matches('=')))
        .map_err(|e| PrintlinkError::InvalidPayload(format!("invalid base64 data: {e}")))
}

/// Download a remote document.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| PrintlinkError::Fetch(format!("client setup: {e}")))?;

    debug!("downloading payload");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PrintlinkError::Fetch(format!("{url}: {e}")))?
        .error_for_status()
        .map_err(|e| PrintlinkError::Fetch(format!("{url}: {e}")))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PrintlinkError::Fetch(format!("{url}: read body: {e}")))?;

    info!(bytes = bytes.len(), "payload downloaded");
    Ok(bytes.to_vec())
}
