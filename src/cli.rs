//! Command-line interface.

use crate::config::{ContentWriteFailure, FileConfig, ProgressMode, SenderConfig};
use crate::error::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "filecopy-agent",
    version,
    about = "Send files and directory trees over stdout, then verify with the receiver on stdin"
)]
pub struct Args {
    /// Files or directories to send
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file (default: <config dir>/filecopy-agent/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bytes per content read/write
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Progress reporting
    #[arg(long, value_enum, env = "PROGRESS_TYPE")]
    pub progress: Option<ProgressMode>,

    /// Expected total size, shown by console progress
    #[arg(long, value_name = "BYTES", env = "FILECOPY_TOTAL_SIZE", hide = true)]
    pub total_size: Option<u64>,

    /// What to do when file content cannot be written to the receiver
    #[arg(long = "on-content-write-failure", value_enum, value_name = "POLICY")]
    pub content_write_failure: Option<ContentWriteFailure>,
}

impl Args {
    /// Merge flags over file configuration and validate the result.
    pub fn sender_config(&self, file: &FileConfig) -> Result<SenderConfig> {
        let mut config = SenderConfig::from_file_config(file);
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(progress) = self.progress {
            config.progress = progress;
        }
        if let Some(policy) = self.content_write_failure {
            config.content_write_failure = policy;
        }
        config.total_size = self.total_size;
        config.validate()?;
        Ok(config)
    }
}

/// Exit status after a failed parse.
///
/// `--help` and `--version` succeed; every usage error exits with 1, the
/// same status as any other failure.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}
