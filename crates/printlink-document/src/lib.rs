// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printlink-document — Turning `/print` payloads into printer bytes.
//
// Payloads arrive as base64, `data:` URLs, or http(s) URLs; receipt printers
// additionally get ESC/POS raster graphics for logos.

pub mod escpos;
pub mod payload;

pub use escpos::{logo_receipt, raster_from_bytes, raster_image};
pub use payload::{Payload, decode_base64, fetch};
