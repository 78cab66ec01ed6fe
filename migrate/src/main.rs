//! Apply the project's `core` migrations and remind the operator to restart
//! the application server.
//!
//! Install the binary one level below the project root, e.g.
//! `<project>/scripts/migrate`. It takes no arguments.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use migrate::apply::{ManagePy, Outcome, apply_migrations};
use migrate::exit_codes;
use migrate::io::config::{CONFIG_FILE_NAME, load_config};
use migrate::io::root::project_root;
use migrate::logging;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "migrate",
    version,
    about = "Apply core migrations and remind to restart gunicorn"
)]
struct Cli {}

fn main() -> ExitCode {
    let _cli = Cli::parse();
    logging::init();

    match run() {
        Ok(outcome) => ExitCode::from(exit_codes::to_exit_byte(outcome.exit_code())),
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(exit_codes::to_exit_byte(exit_codes::for_error(&err)))
        }
    }
}

fn run() -> Result<Outcome> {
    let root = project_root()?;
    std::env::set_current_dir(&root)
        .with_context(|| format!("change directory to {}", root.display()))?;
    debug!(root = %root.display(), "working directory set");

    let config = load_config(&root.join(CONFIG_FILE_NAME))?;
    let mut stdout = std::io::stdout().lock();
    apply_migrations(&root, &config, &ManagePy, &mut stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_no_arguments() {
        assert!(Cli::try_parse_from(["migrate"]).is_ok());
    }

    #[test]
    fn rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["migrate", "core"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["migrate", "--fake"]).is_err());
    }
}
