//! I/O helpers for the migration runner.

pub mod config;
pub mod process;
pub mod root;
pub mod venv;
