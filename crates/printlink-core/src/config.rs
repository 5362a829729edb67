// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Worker configuration — the named settings passed to the remote-print worker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PrintlinkError, Result};

pub const KEY_SITE: &str = "site";
pub const KEY_PROVIDER: &str = "provider";
pub const KEY_HOST: &str = "host";
pub const KEY_PORT: &str = "port";
pub const KEY_EMAIL: &str = "email";
/// Auto-start flag. The key name is kept for compatibility with existing
/// installs and the configuration form.
pub const KEY_AUTO_START: &str = "start_vortex";

/// Keys that must be present and non-empty before the worker can launch.
pub const REQUIRED_KEYS: [&str; 5] = [KEY_SITE, KEY_PROVIDER, KEY_HOST, KEY_PORT, KEY_EMAIL];

/// Every key the store accepts.
pub const ALL_KEYS: [&str; 6] = [
    KEY_SITE,
    KEY_PROVIDER,
    KEY_HOST,
    KEY_PORT,
    KEY_EMAIL,
    KEY_AUTO_START,
];

/// Persistent worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Public site the worker registers with.
    pub site: String,
    /// Transport provider (the form always submits `http`).
    pub provider: String,
    /// Address the worker binds to.
    pub host: String,
    /// Port the worker binds to.
    pub port: String,
    /// Account e-mail.
    pub email: String,
    /// `"true"` when the worker should be launched automatically.
    pub start_vortex: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            site: String::new(),
            provider: "http".into(),
            host: String::new(),
            port: String::new(),
            email: String::new(),
            start_vortex: "true".into(),
        }
    }
}

impl WorkerConfig {
    /// Read a setting by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            KEY_SITE => &self.site,
            KEY_PROVIDER => &self.provider,
            KEY_HOST => &self.host,
            KEY_PORT => &self.port,
            KEY_EMAIL => &self.email,
            KEY_AUTO_START => &self.start_vortex,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Overwrite a setting by key. Unknown keys are rejected.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let slot = match key {
            KEY_SITE => &mut self.site,
            KEY_PROVIDER => &mut self.provider,
            KEY_HOST => &mut self.host,
            KEY_PORT => &mut self.port,
            KEY_EMAIL => &mut self.email,
            KEY_AUTO_START => &mut self.start_vortex,
            other => {
                return Err(PrintlinkError::InvalidPayload(format!(
                    "unknown configuration key '{other}'"
                )));
            }
        };
        *slot = value.into();
        Ok(())
    }

    /// Merge a JSON object of updates into this configuration.
    ///
    /// Strings are stored as-is, booleans become `"true"`/`"false"` and
    /// numbers are stored in their decimal form. Nothing is modified if any
    /// entry is rejected.
    pub fn apply(&mut self, updates: &serde_json::Map<String, Value>) -> Result<()> {
        let mut next = self.clone();
        for (key, value) in updates {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(PrintlinkError::InvalidPayload(format!(
                        "configuration value for '{key}' must be a string"
                    )));
                }
            };
            next.set(key, text)?;
        }
        *self = next;
        Ok(())
    }

    /// `(key, value)` pairs in a stable order, for persistence.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            (KEY_SITE, self.site.as_str()),
            (KEY_PROVIDER, self.provider.as_str()),
            (KEY_HOST, self.host.as_str()),
            (KEY_PORT, self.port.as_str()),
            (KEY_EMAIL, self.email.as_str()),
            (KEY_AUTO_START, self.start_vortex.as_str()),
        ]
    }

    /// Required keys that are missing or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| self.get(key).is_none_or(|v| v.trim().is_empty()))
            .collect()
    }

    /// True when every required key has a non-empty value.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// True when the worker should be launched automatically.
    pub fn auto_start(&self) -> bool {
        self.start_vortex.trim().eq_ignore_ascii_case("true")
    }
}
