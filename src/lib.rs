//! Sending half of a pipe-based file copy protocol.
//!
//! Walks each path argument, frames every file and directory into one byte
//! stream on stdout, and finishes with a checksum handshake read from stdin.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod path;
pub mod streaming;

pub use error::{Result, TransferError};
