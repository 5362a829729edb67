// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printlink Store — the configuration store shared by the HTTP surface and
// the worker supervisor.  Reads are served from memory; writes go to durable
// storage first and only then become visible.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryConfigStore;
pub use sqlite::SqliteConfigStore;

use printlink_core::WorkerConfig;
use printlink_core::error::Result;
use serde_json::{Map, Value};

/// Authoritative get/set access to the worker configuration.
///
/// Implementations are synchronous: every read reflects the latest
/// successful write.
pub trait ConfigStore: Send + Sync {
    /// The full configuration, defaults included.
    fn get(&self) -> WorkerConfig;

    /// Merge `updates` into the stored configuration and persist it.
    fn set(&self, updates: &Map<String, Value>) -> Result<()>;

    /// All required settings present and non-empty.
    fn is_complete(&self) -> bool {
        self.get().is_complete()
    }

    /// Whether the worker should be launched automatically.
    fn auto_start_enabled(&self) -> bool {
        self.get().auto_start()
    }
}
