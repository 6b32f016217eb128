//! A transfer session: every root walked into one stream, then the handshake.
//!
//! ```text
//! Idle -> Walking -> SentinelSent -> AwaitingResult -> Completed
//!           |                                      \-> FailedIntegrity
//!           |                                      \-> FailedRemote
//!           \-> FailedLocal
//! ```
//!
//! Failure states are terminal: once the stream is broken nothing more is
//! written to it. There is one session per process.

use crate::config::SenderConfig;
use crate::error::{Result, TransferError};
use crate::path::TransferRoot;
use crate::streaming::handshake::{read_result, send_sentinel, verify};
use crate::streaming::progress::{Progress, ProgressFlag};
use crate::streaming::protocol::ResultHeader;
use crate::streaming::walker::{TreeWalker, WalkStats};
use crate::streaming::writer::StreamWriter;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Walking,
    SentinelSent,
    AwaitingResult,
    Completed,
    FailedIntegrity,
    FailedRemote,
    /// Walking or sending failed on this side.
    FailedLocal,
}

pub struct Session<R: Read, W: Write> {
    input: R,
    out: StreamWriter<W>,
    config: SenderConfig,
    state: SessionState,
    stats: WalkStats,
}

impl<R: Read, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, config: SenderConfig) -> Self {
        let mut progress = Progress::new(config.progress, config.total_size);
        progress.notify(0, ProgressFlag::Init);
        Self {
            input,
            out: StreamWriter::new(output, progress),
            config,
            state: SessionState::Idle,
            stats: WalkStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Running checksum over everything sent so far.
    pub fn checksum(&self) -> u32 {
        self.out.checksum()
    }

    pub fn bytes_sent(&self) -> u64 {
        self.out.bytes_sent()
    }

    pub fn output(&self) -> &W {
        self.out.get_ref()
    }

    /// Walk `root` into the stream.
    pub fn send_path(&mut self, root: &TransferRoot) -> Result<()> {
        self.expect_open("send a path")?;
        self.state = SessionState::Walking;
        tracing::debug!(base = %root.base.display(), name = %root.name, "walking");

        match TreeWalker::new(&mut self.out, &self.config).walk(root) {
            Ok(stats) => {
                self.stats.dirs += stats.dirs;
                self.stats.files += stats.files;
                self.stats.content_bytes += stats.content_bytes;
                Ok(())
            }
            Err(err @ TransferError::ContentWrite { deferred: false, .. }) => {
                Err(self.remote_verdict_or(err))
            }
            Err(err) => {
                self.state = SessionState::FailedLocal;
                Err(err)
            }
        }
    }

    /// Send the sentinel, wait for the receiver and check its verdict.
    pub fn finish(&mut self) -> Result<ResultHeader> {
        self.expect_open("finish")?;

        if let Err(err) = send_sentinel(&mut self.out) {
            self.state = SessionState::FailedLocal;
            return Err(err);
        }
        self.state = SessionState::SentinelSent;
        tracing::debug!(bytes = self.out.bytes_sent(), "sentinel sent");

        self.state = SessionState::AwaitingResult;
        let result = match read_result(&mut self.input) {
            Ok(result) => result,
            Err(err) => {
                self.state = SessionState::FailedRemote;
                return Err(err);
            }
        };

        let local = self.out.checksum();
        tracing::info!(
            error_code = result.error_code,
            remote_crc = result.crc32,
            local_crc = local,
            "received result"
        );

        if let Err(err) = verify(&result, local) {
            self.state = match err {
                TransferError::ChecksumMismatch { .. } => SessionState::FailedIntegrity,
                _ => SessionState::FailedRemote,
            };
            return Err(err);
        }

        self.state = SessionState::Completed;
        self.out.progress_mut().notify(0, ProgressFlag::Done);
        Ok(result)
    }

    /// Walk every root, then run the handshake.
    pub fn run(mut self, roots: &[TransferRoot]) -> Result<WalkStats> {
        for root in roots {
            self.send_path(root)?;
        }
        self.finish()?;
        Ok(self.stats)
    }

    fn expect_open(&self, action: &str) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Walking => Ok(()),
            state => Err(TransferError::Internal(format!(
                "cannot {action} in state {state:?}"
            ))),
        }
    }

    /// After a reported content-write failure the receiver may still have
    /// sent its result; prefer its error code when there is one.
    fn remote_verdict_or(&mut self, local: TransferError) -> TransferError {
        tracing::warn!(error = %local, "content write failed, waiting for receiver result");
        self.state = SessionState::AwaitingResult;
        let verdict = read_result(&mut self.input);
        self.state = SessionState::FailedRemote;
        match verdict {
            Ok(result) if result.error_code != 0 => TransferError::remote(result.error_code),
            _ => local,
        }
    }
}
