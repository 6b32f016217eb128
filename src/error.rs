use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransferError>;

/// Every way a transfer session can end early.
///
/// Nothing here is retried: each variant terminates the session and the
/// process exits with status 1 after the message (if any) is shown.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Cannot get attributes of {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot open file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot list directory {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Copying file {}: {source}", .path.display())]
    ReadContent {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot convert path '{}' to UTF-8", .path.display())]
    InvalidName { path: PathBuf },

    #[error("Unsupported file type: {}", .path.display())]
    UnsupportedType { path: PathBuf },

    /// A followed link leads back into a directory still being walked.
    #[error("Directory cycle through symbolic link: {}", .path.display())]
    DirectoryCycle { path: PathBuf },

    #[error("Invalid path argument '{}': {reason}", .path.display())]
    Argument { path: PathBuf, reason: String },

    #[error("{value} does not fit in the {field} header field")]
    FieldOverflow { field: &'static str, value: u64 },

    #[error("{}", internal_message(.0))]
    Internal(String),

    /// Header or name bytes could not be written; the receiver's framing is lost.
    #[error("Writing to the receiver failed: {0}")]
    FramingWrite(#[source] io::Error),

    /// Content bytes could not be written. The receiver is expected to notice
    /// the truncation and report it.
    #[error("Writing file content to the receiver failed: {source}")]
    ContentWrite {
        path: PathBuf,
        deferred: bool,
        #[source]
        source: io::Error,
    },

    #[error("No result received from the receiver: {0}")]
    NoResult(#[source] io::Error),

    #[error("Error writing files: {description}")]
    Remote { code: u32, description: String },

    #[error("File transfer failed: checksum mismatch")]
    ChecksumMismatch { local: u32, remote: u32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TransferError {
    /// Errors whose diagnostic is left to the receiving side.
    ///
    /// The process still exits with status 1, but nothing is shown locally.
    pub fn is_deferred(&self) -> bool {
        match self {
            TransferError::ContentWrite { deferred, .. } => *deferred,
            TransferError::NoResult(_) => true,
            _ => false,
        }
    }

    pub fn remote(code: u32) -> Self {
        TransferError::Remote {
            code,
            description: describe_error_code(code),
        }
    }

    /// Exit status for the process. Every failure maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Map a receiver-reported error code to a description.
///
/// The receiver reports `errno` values, so the host's OS error table is used.
pub fn describe_error_code(code: u32) -> String {
    match i32::try_from(code) {
        Ok(raw) => io::Error::from_raw_os_error(raw).to_string(),
        Err(_) => format!("Unknown error {code}"),
    }
}

#[cfg(debug_assertions)]
fn internal_message(detail: &str) -> String {
    format!("Internal error: {detail}")
}

#[cfg(not(debug_assertions))]
fn internal_message(_detail: &str) -> String {
    "Internal error".to_string()
}
