//! CLI support for sluice
//!
//! Provides programmatic access to the `sluice` command so other tools can
//! validate or evaluate filter queries the same way the binary does.

mod check;

pub use check::{CheckOptions, CheckResult, execute_check, explain};

use std::io;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Query failed to tokenize, parse or run
    #[error("{0}")]
    Query(#[from] crate::QueryError),

    /// Context is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `sluice=debug` and
/// the default is warnings only.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "sluice=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when embedded in another tool.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
