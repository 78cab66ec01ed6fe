//! Diagnostic tracing for the migration runner.
//!
//! Tracing output goes to stderr only. Stdout carries the operator-facing
//! status lines and the migration tool's own output, and is never touched by
//! `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset, which keeps a normal
/// run silent apart from the two status lines.
///
/// # Example
/// ```bash
/// RUST_LOG=migrate=debug scripts/migrate
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
