//! Orchestration for applying migrations.
//!
//! Steps run strictly in order and stop at the first fatal failure:
//! activate the virtualenv (best-effort), announce, run the migration tool,
//! print the restart reminder. Nothing is retried.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::exit_codes;
use crate::io::config::MigrateConfig;
use crate::io::process::{MigrationCommand, run_migration};
use crate::io::venv::activate;

/// Result of a run that reached the migration tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The tool exited 0 and the reminder was printed.
    Applied,
    /// The tool exited non-zero; `code` is propagated as the process exit code.
    Failed { code: i32 },
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Applied => exit_codes::OK,
            Outcome::Failed { code } => code,
        }
    }
}

/// Something that can apply migrations for a prepared command.
pub trait MigrationTool {
    /// Run the migration and return its exit code.
    fn migrate(&self, migration: &MigrationCommand) -> Result<i32>;
}

/// Production tool: spawns the management script in the foreground.
pub struct ManagePy;

impl MigrationTool for ManagePy {
    fn migrate(&self, migration: &MigrationCommand) -> Result<i32> {
        run_migration(migration)
    }
}

/// Apply `config.app` migrations for the project at `root`.
///
/// Status lines go to `out`; the tool writes to the inherited stdio. The
/// announcement is flushed before the tool is spawned.
#[instrument(skip_all, fields(root = %root.display(), app = %config.app))]
pub fn apply_migrations<T: MigrationTool, W: Write>(
    root: &Path,
    config: &MigrateConfig,
    tool: &T,
    out: &mut W,
) -> Result<Outcome> {
    let activation = activate(root, &config.venv_dir);
    let migration = MigrationCommand::new(root, config, activation);

    writeln!(out, "{}", config.announce_line()).context("write status line")?;
    out.flush().context("flush stdout")?;

    let code = tool.migrate(&migration)?;
    if code != exit_codes::OK {
        debug!(exit_code = code, "migration tool failed");
        return Ok(Outcome::Failed { code });
    }

    writeln!(out, "{}", config.done_line()).context("write status line")?;
    out.flush().context("flush stdout")?;
    info!("migrations applied");
    Ok(Outcome::Applied)
}
