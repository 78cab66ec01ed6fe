//! Best-effort Python virtualenv activation.
//!
//! Sourcing `activate` in a shell sets `VIRTUAL_ENV`, prepends the venv's
//! script directory to `PATH` and unsets `PYTHONHOME`. The runner reproduces
//! those changes on the migration tool's [`Command`] instead of its own
//! environment. A missing or unreadable activate file is never fatal.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

#[cfg(windows)]
const SCRIPTS_DIR: &str = "Scripts";
#[cfg(not(windows))]
const SCRIPTS_DIR: &str = "bin";

/// An activated virtualenv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    /// Value exported as `VIRTUAL_ENV`.
    pub root: PathBuf,
    /// Directory prepended to `PATH`.
    pub bin_dir: PathBuf,
}

impl VirtualEnv {
    fn new(root: PathBuf) -> Self {
        let bin_dir = root.join(SCRIPTS_DIR);
        Self { root, bin_dir }
    }

    /// Absolute path of `program` inside the venv, if it exists there.
    pub fn program(&self, program: &str) -> Option<PathBuf> {
        let candidate = self.bin_dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = self.bin_dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    }

    /// Apply the environment changes `activate` would make.
    pub fn apply(&self, cmd: &mut Command) -> Result<()> {
        let mut paths = vec![self.bin_dir.clone()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        let path: OsString = std::env::join_paths(paths).context("join PATH entries")?;
        cmd.env("VIRTUAL_ENV", &self.root)
            .env("PATH", path)
            .env_remove("PYTHONHOME");
        Ok(())
    }
}

/// Outcome of the activation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Activated(VirtualEnv),
    Missing { activate_path: PathBuf },
    Failed { activate_path: PathBuf, reason: String },
}

impl Activation {
    pub fn venv(&self) -> Option<&VirtualEnv> {
        match self {
            Activation::Activated(venv) => Some(venv),
            Activation::Missing { .. } | Activation::Failed { .. } => None,
        }
    }
}

/// Path of the activate script for `venv_dir` under `root`.
pub fn activate_path(root: &Path, venv_dir: &str) -> PathBuf {
    root.join(venv_dir).join(SCRIPTS_DIR).join("activate")
}

/// Try to activate `<root>/<venv_dir>`. Never fails; problems are logged and
/// reported through [`Activation`].
#[instrument(skip_all, fields(venv_dir = %venv_dir))]
pub fn activate(root: &Path, venv_dir: &str) -> Activation {
    let activate_path = activate_path(root, venv_dir);
    if !activate_path.exists() {
        info!(path = %activate_path.display(), "no virtualenv activate script, continuing");
        return Activation::Missing { activate_path };
    }
    match read_activate(&activate_path) {
        Ok(contents) => {
            let venv_root = declared_virtual_env(&contents)
                .filter(|declared| declared.is_dir())
                .unwrap_or_else(|| root.join(venv_dir));
            debug!(venv = %venv_root.display(), "virtualenv activated");
            Activation::Activated(VirtualEnv::new(venv_root))
        }
        Err(err) => {
            let reason = format!("{err:#}");
            info!(
                path = %activate_path.display(),
                reason = %reason,
                "virtualenv activation failed, continuing"
            );
            Activation::Failed {
                activate_path,
                reason,
            }
        }
    }
}

fn read_activate(path: &Path) -> Result<String> {
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if !meta.is_file() {
        return Err(anyhow!("{} is not a regular file", path.display()));
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Extract the `VIRTUAL_ENV=...` assignment from an activate script.
///
/// Handles the `VIRTUAL_ENV="/path"`, `VIRTUAL_ENV='/path'` and
/// `export VIRTUAL_ENV=/path` forms. Assignments that expand shell variables
/// or command substitutions are ignored.
fn declared_virtual_env(contents: &str) -> Option<PathBuf> {
    contents.lines().find_map(|line| {
        let line = line.trim();
        let line = line.strip_prefix("export ").unwrap_or(line);
        let value = line.strip_prefix("VIRTUAL_ENV=")?.trim();
        let value = unquote(value);
        if value.is_empty() || value.contains('$') || value.contains('`') {
            return None;
        }
        Some(PathBuf::from(value))
    })
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
