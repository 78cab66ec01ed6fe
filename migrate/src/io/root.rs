//! Project root resolution.
//!
//! The binary is installed one level below the project root (for example
//! `<project>/scripts/migrate`), so the root is the parent of the directory
//! holding the executable. The caller's working directory plays no part.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, instrument};

/// Resolve the project root for the currently running executable.
pub fn project_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("resolve executable path")?;
    project_root_for(&exe)
}

/// Resolve the project root for an executable located at `exe`.
///
/// Fails if `exe` has no parent directory, or if `<exe dir>/..` does not exist
/// or is not a directory.
#[instrument(skip_all, fields(exe = %exe.display()))]
pub fn project_root_for(exe: &Path) -> Result<PathBuf> {
    let exe_dir = exe
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .with_context(|| format!("executable {} has no parent directory", exe.display()))?;
    let candidate = exe_dir.join("..");
    let root = fs::canonicalize(&candidate)
        .with_context(|| format!("resolve project root {}", candidate.display()))?;
    if !root.is_dir() {
        bail!("project root {} is not a directory", root.display());
    }
    debug!(root = %root.display(), "resolved project root");
    Ok(root)
}
