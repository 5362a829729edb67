// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration store backed by SQLite.
//
// Settings live in a single key/value table so they survive restarts of the
// control process.  A copy of the current configuration is cached in memory;
// the supervisor polls the store every tick and must never wait on disk.

use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};

use rusqlite::{Connection, params};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use printlink_core::WorkerConfig;
use printlink_core::error::{PrintlinkError, Result};

use crate::ConfigStore;

/// SQLite schema for the settings table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
"#;

/// Durable configuration store.
pub struct SqliteConfigStore {
    /// The open SQLite connection; only touched by writers.
    conn: Mutex<Connection>,
    /// Last successfully persisted configuration.
    cache: RwLock<WorkerConfig>,
}

impl SqliteConfigStore {
    /// Open (or create) the settings database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| PrintlinkError::Database(format!("open: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| PrintlinkError::Database(format!("WAL pragma: {e}")))?;

        let store = Self::from_connection(conn)?;
        info!("settings database opened");
        Ok(store)
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PrintlinkError::Database(format!("open in-memory: {e}")))?;
        debug!("in-memory settings database opened");
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| PrintlinkError::Database(format!("create table: {e}")))?;

        let config = load(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            cache: RwLock::new(config),
        })
    }
}

/// Read every stored setting on top of the defaults.
fn load(conn: &Connection) -> Result<WorkerConfig> {
    let mut stmt = conn
        .prepare("SELECT key, value FROM settings")
        .map_err(|e| PrintlinkError::Database(format!("prepare load: {e}")))?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| PrintlinkError::Database(format!("query settings: {e}")))?;

    let mut config = WorkerConfig::default();
    for row in rows {
        let (key, value) = row.map_err(|e| PrintlinkError::Database(format!("read row: {e}")))?;
        // Rows written by older releases may carry keys we no longer use.
        if config.set(&key, value).is_err() {
            debug!(key = %key, "ignoring unknown stored setting");
        }
    }
    Ok(config)
}

impl ConfigStore for SqliteConfigStore {
    fn get(&self) -> WorkerConfig {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[instrument(skip_all, fields(keys = updates.len()))]
    fn set(&self, updates: &Map<String, Value>) -> Result<()> {
        // Writers serialize on the connection so concurrent saves can't lose
        // each other's keys.
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = self.get();
        next.apply(updates)?;

        {
            let tx = conn
                .transaction()
                .map_err(|e| PrintlinkError::Database(format!("begin: {e}")))?;
            for (key, value) in next.entries() {
                tx.execute(
                    "INSERT INTO settings (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value],
                )
                .map_err(|e| PrintlinkError::Database(format!("upsert {key}: {e}")))?;
            }
            tx.commit()
                .map_err(|e| PrintlinkError::Database(format!("commit: {e}")))?;
        }

        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = next;
        drop(conn);
        info!("configuration saved");
        Ok(())
    }
}
