//! Tracing setup.
//!
//! Logs always go to stderr: stdout carries the protocol stream.

use crate::error::{Result, TransferError};
use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity count.
///
/// `quiet` wins over everything; otherwise 0=warn (or `configured`),
/// 1=info, 2=debug, 3+=trace.
pub fn level_for(verbosity: u8, quiet: bool, configured: Option<&str>) -> String {
    if quiet {
        return "error".to_string();
    }
    let level = match verbosity {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("filecopy_agent={level}")
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| TransferError::Config(format!("cannot initialize logging: {e}")))
}
