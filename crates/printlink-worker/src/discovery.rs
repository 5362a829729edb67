// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Worker executable discovery.
//
// Candidates are searched in a fixed order and the first existing file
// wins:
//   1. an explicit `--worker-path`
//   2. next to the running control binary
//   3. the AppImage mount (`$APPDIR/usr/bin`)
//   4. the current working directory
//   5. the crate directory, in debug builds run from a checkout

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Default worker executable name (without platform suffix).
pub const DEFAULT_WORKER_NAME: &str = "vortex";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableLocator {
    candidates: Vec<PathBuf>,
}

impl ExecutableLocator {
    /// Build the standard search list for `name`.
    pub fn new(name: &str, explicit: Option<PathBuf>) -> Self {
        let file_name = format!("{name}{}", env::consts::EXE_SUFFIX);
        let mut dirs: Vec<PathBuf> = Vec::new();

        if let Some(dir) = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(dir);
        }
        if let Some(appdir) = env::var_os("APPDIR") {
            dirs.push(PathBuf::from(appdir).join("usr").join("bin"));
        }
        if let Ok(cwd) = env::current_dir() {
            dirs.push(cwd);
        }
        if cfg!(debug_assertions) {
            dirs.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
        }

        let mut candidates: Vec<PathBuf> = explicit.into_iter().collect();
        candidates.extend(dirs.into_iter().map(|dir| dir.join(&file_name)));
        Self::with_candidates(candidates)
    }

    /// Search exactly `candidates`, in order.  Duplicates are dropped.
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        Self { candidates: unique }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists as a file.
    pub fn locate(&self) -> Option<PathBuf> {
        let found = self.candidates.iter().find(|path| path.is_file()).cloned();
        match &found {
            Some(path) => info!(path = %path.display(), "found worker executable"),
            None => debug!(searched = self.candidates.len(), "worker executable not found"),
        }
        found
    }
}
