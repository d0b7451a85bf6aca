//! Shell-like path expansion for paths given on the command line.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the home directory.
///
/// Absolute and relative paths are returned unchanged; an empty or
/// whitespace-only input yields an empty path.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return PathBuf::new();
    }
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Expands `~` and resolves relative paths against `base_dir`.
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: &Path) -> PathBuf {
    let expanded = expand(path);
    if expanded.as_os_str().is_empty() || expanded.is_absolute() {
        return expanded;
    }
    base_dir.join(expanded)
}

/// Resolves a user-supplied path against the current directory.
///
/// Falls back to plain expansion if the current directory is unavailable.
#[must_use]
pub fn resolve_cli_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match std::env::current_dir() {
        Ok(cwd) => expand_and_resolve(&raw, &cwd),
        Err(_) => expand(&raw),
    }
}
