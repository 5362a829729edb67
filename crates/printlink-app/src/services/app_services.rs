// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Startup wiring: settings store, print backend and worker supervisor.
//
// Storage problems never stop the control surface from coming up; the
// process falls back to in-memory settings and says so in the log.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use printlink_print::{CupsBackend, MemoryBackend, PrintBackend};
use printlink_store::{ConfigStore, MemoryConfigStore, SqliteConfigStore};
use printlink_worker::launch::{WORKER_SECRET, mask};
use printlink_worker::{ExecutableLocator, Supervisor, SupervisorHandle};

use super::data_dir;
use crate::args::{Args, BackendKind};

const SETTINGS_FILE: &str = "settings.db";

/// Everything built from the command line at startup.
pub struct AppServices {
    pub store: Arc<dyn ConfigStore>,
    pub backend: Arc<dyn PrintBackend>,
    pub supervisor: SupervisorHandle,
    pub data_dir: PathBuf,
}

impl AppServices {
    /// Build all services and start the supervisor on the current runtime.
    pub fn init(args: &Args) -> Self {
        let dir = data_dir::resolve(args.data_dir.as_deref());
        info!(path = %dir.display(), "initialising app services");

        let store = open_store(&dir);
        let backend = print_backend(args.backend);
        let locator = ExecutableLocator::new(&args.worker_name, args.worker_path.clone());

        info!(
            listen = %args.listen,
            data_dir = %dir.display(),
            worker = %args.worker_name,
            search = ?locator.candidates(),
            secret = %mask(WORKER_SECRET),
            "printlink starting"
        );
        info!("configuration: http://localhost:{}/config", args.listen.port());
        info!("status monitor: http://localhost:{}/status", args.listen.port());

        let supervisor = Supervisor::new(store.clone(), locator, args.timings()).spawn();

        Self {
            store,
            backend,
            supervisor,
            data_dir: dir,
        }
    }
}

/// SQLite settings under `dir`, or volatile settings if that fails.
pub fn open_store(dir: &Path) -> Arc<dyn ConfigStore> {
    let opened = std::fs::create_dir_all(dir)
        .map_err(printlink_core::PrintlinkError::from)
        .and_then(|()| SqliteConfigStore::open(dir.join(SETTINGS_FILE)));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, path = %dir.display(), "settings storage unavailable, using in-memory fallback");
            Arc::new(MemoryConfigStore::fallback())
        }
    }
}

pub fn print_backend(kind: BackendKind) -> Arc<dyn PrintBackend> {
    match kind {
        BackendKind::Cups => Arc::new(CupsBackend::new()),
        BackendKind::Memory => {
            info!("memory print backend selected, jobs are recorded but not printed");
            Arc::new(MemoryBackend::new(Vec::new()))
        }
    }
}
