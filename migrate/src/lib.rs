//! Deployment helper that applies a project's `core` migrations.
//!
//! The runner is a straight-line, fail-fast procedure:
//!
//! 1. resolve the project root from the executable's own location,
//! 2. activate the project's Python virtualenv if one is present,
//! 3. run `manage.py migrate core` with inherited stdio,
//! 4. remind the operator to restart the application server.
//!
//! - **[`io`]**: Side-effecting pieces (root resolution, venv activation,
//!   config loading, process spawning).
//! - **[`apply`]**: Orchestration of the steps above behind the
//!   [`apply::MigrationTool`] seam so it can be driven by scripted tools in tests.

pub mod apply;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
