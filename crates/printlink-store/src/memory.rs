// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Volatile configuration store, used when no data directory is writable and
// in tests.

use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value};
use tracing::warn;

use printlink_core::WorkerConfig;
use printlink_core::error::Result;

use crate::ConfigStore;

/// Configuration held only in memory.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: RwLock<WorkerConfig>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn with_config(config: WorkerConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Process-lifetime fallback when the settings database can't be opened.
    pub fn fallback() -> Self {
        warn!("configuration will not persist across restarts");
        Self::new()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self) -> WorkerConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, updates: &Map<String, Value>) -> Result<()> {
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        guard.apply(updates)
    }
}
