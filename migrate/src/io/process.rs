//! Spawning the external migration tool.
//!
//! The migration tool runs in the foreground: stdio is inherited so the
//! operator sees its progress and any prompt, and the runner blocks until it
//! exits.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, error, instrument};

use super::config::MigrateConfig;
use super::venv::Activation;
use crate::exit_codes;

/// The migration tool could not be started.
#[derive(Debug, Error)]
#[error("spawn {command}")]
pub struct SpawnError {
    pub command: String,
    #[source]
    pub source: io::Error,
}

impl SpawnError {
    /// The interpreter was not found, the shell's "command not found" case.
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// One `<interpreter> <manage_script> migrate <app>` invocation.
#[derive(Debug, Clone)]
pub struct MigrationCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub workdir: PathBuf,
    pub activation: Activation,
}

impl MigrationCommand {
    /// Build the invocation for `config` in `root`.
    ///
    /// With an activated virtualenv the interpreter is taken from the venv
    /// when present there; otherwise it is left to `PATH` lookup.
    pub fn new(root: &Path, config: &MigrateConfig, activation: Activation) -> Self {
        let program = activation
            .venv()
            .and_then(|venv| venv.program(&config.interpreter))
            .unwrap_or_else(|| PathBuf::from(&config.interpreter));
        Self {
            program,
            args: vec![
                OsString::from(&config.manage_script),
                OsString::from("migrate"),
                OsString::from(&config.app),
            ],
            workdir: root.to_path_buf(),
            activation,
        }
    }

    /// Human-readable form for logs and error context.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Build the process with inherited stdio and activation applied.
    pub fn to_command(&self) -> Result<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(venv) = self.activation.venv() {
            venv.apply(&mut cmd)?;
        }
        Ok(cmd)
    }
}

/// Run the migration tool to completion and return its exit code.
#[instrument(skip_all, fields(command = %migration.display()))]
pub fn run_migration(migration: &MigrationCommand) -> Result<i32> {
    let mut cmd = migration.to_command()?;
    debug!(workdir = %migration.workdir.display(), "spawning migration tool");
    let status = match cmd.status() {
        Ok(status) => status,
        Err(e) => {
            error!(err = %e, "failed to spawn migration tool");
            return Err(SpawnError {
                command: migration.display(),
                source: e,
            }
            .into());
        }
    };
    let code = exit_code_of(status);
    debug!(exit_code = code, "migration tool finished");
    Ok(code)
}

/// Exit code to propagate for a finished child.
///
/// Children killed by a signal map to `128 + signal` on Unix, as a shell
/// reports them.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return exit_codes::SIGNAL_BASE + signal;
        }
    }
    exit_codes::INVALID
}
