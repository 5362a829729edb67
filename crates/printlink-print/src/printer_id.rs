// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stable short printer identifiers.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept (8 hex characters).
const ID_BYTES: usize = 4;

/// Derive a short identifier from a printer's name, port and driver.
///
/// Clients store this id instead of the display name. It is a pure function
/// of the triple: the same printer always maps to the same id, and
/// collisions only matter when two printers share every field anyway.
pub fn printer_id(name: &str, port: &str, driver: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{name}|{port}|{driver}").as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..ID_BYTES])
}
