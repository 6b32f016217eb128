//! Sender configuration.
//!
//! Values come from an optional TOML file and are overridden by command-line
//! flags. A missing file at the default location is not an error.

use crate::error::{Result, TransferError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default size of content reads and writes.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted chunk size.
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// What to do when file content cannot be written to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentWriteFailure {
    /// Exit with status 1 and leave the message to the receiver.
    #[default]
    Defer,
    /// Report a local error, after still asking the receiver for its result.
    Report,
}

/// How transfer progress is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    #[default]
    None,
    /// `info!` events through the tracing subscriber. Also accepts `gui`,
    /// which has no display channel here.
    #[value(alias = "gui")]
    #[serde(alias = "gui")]
    Log,
    /// `sent X/Y KB` lines on stderr.
    Console,
}

/// On-disk configuration; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub chunk_size: Option<usize>,
    pub progress: Option<ProgressMode>,
    pub content_write_failure: Option<ContentWriteFailure>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            TransferError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
            .map_err(|e| TransferError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// `<config dir>/filecopy-agent/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("filecopy-agent").join("config.toml"))
}

/// Settings used by a transfer session.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub chunk_size: usize,
    pub progress: ProgressMode,
    pub content_write_failure: ContentWriteFailure,
    /// Expected total size, used only for console progress.
    pub total_size: Option<u64>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: ProgressMode::None,
            content_write_failure: ContentWriteFailure::Defer,
            total_size: None,
        }
    }
}

impl SenderConfig {
    /// Apply file values on top of the defaults.
    pub fn from_file_config(file: &FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            chunk_size: file.chunk_size.unwrap_or(defaults.chunk_size),
            progress: file.progress.unwrap_or(defaults.progress),
            content_write_failure: file
                .content_write_failure
                .unwrap_or(defaults.content_write_failure),
            total_size: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(TransferError::Config(format!(
                "chunk size must be between 1 and {} bytes, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        Ok(())
    }
}
