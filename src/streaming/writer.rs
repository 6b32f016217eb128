//! Outgoing stream with a running checksum.
//!
//! Every byte handed to [`StreamWriter::send`] updates the checksum before the
//! write is attempted, so the checksum always covers exactly what the
//! receiver was offered, in order.

use crate::error::{Result, TransferError};
use crate::streaming::checksum::RunningChecksum;
use crate::streaming::progress::{Progress, ProgressFlag};
use std::io::{self, Write};

pub struct StreamWriter<W: Write> {
    inner: W,
    checksum: RunningChecksum,
    progress: Progress,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W, progress: Progress) -> Self {
        Self {
            inner,
            checksum: RunningChecksum::new(),
            progress,
        }
    }

    /// Blocking write of `bytes`, checksummed first.
    ///
    /// A short write is an error. Callers decide how fatal it is.
    pub fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.checksum.update(bytes);
        self.inner.write_all(bytes)?;
        self.progress.notify(bytes.len() as u64, ProgressFlag::Normal);
        Ok(())
    }

    /// Write header or name bytes. Any failure desynchronizes the receiver.
    pub fn send_framing(&mut self, bytes: &[u8]) -> Result<()> {
        self.send(bytes).map_err(TransferError::FramingWrite)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(TransferError::FramingWrite)
    }

    /// Checksum of everything sent so far.
    pub fn checksum(&self) -> u32 {
        self.checksum.value()
    }

    /// Bytes successfully written so far.
    pub fn bytes_sent(&self) -> u64 {
        self.progress.total()
    }

    pub fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
