// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "printlink";

/// The settings directory: `explicit` if given, else the platform default.
pub fn resolve(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(dir) => dir.to_path_buf(),
        None => base_dir().join(APP_DIR),
    }
}

fn base_dir() -> PathBuf {
    if let Some(xdg) = non_empty_var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Some(local) = non_empty_var("LOCALAPPDATA") {
        return PathBuf::from(local);
    }
    if let Some(home) = non_empty_var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let dir = Path::new("/srv/printlink");
        assert_eq!(resolve(Some(dir)), PathBuf::from("/srv/printlink"));
    }

    #[test]
    fn default_ends_in_app_dir() {
        assert!(resolve(None).ends_with(APP_DIR));
    }
}
