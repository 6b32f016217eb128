//! Copies regular file content into the outgoing stream.

use crate::streaming::writer::StreamWriter;
use std::io::{self, Read, Write};

/// Result of copying one file's content.
#[derive(Debug)]
pub enum CopyOutcome {
    Ok,
    /// Local read failed, or the file ended before the advertised length.
    ReadFailure(io::Error),
    /// The outgoing stream rejected content bytes.
    WriteFailure(io::Error),
}

/// Copy exactly `len` bytes from `src` in chunks of at most `chunk_size`.
///
/// Bytes past `len` are never read, so a file that grows during the
/// transfer still matches the length already sent in its header.
pub fn stream_content<R: Read, W: Write>(
    src: &mut R,
    len: u64,
    out: &mut StreamWriter<W>,
    chunk_size: usize,
) -> CopyOutcome {
    let mut remaining = len;
    let buf_len = usize::try_from(len).map_or(chunk_size, |len| len.min(chunk_size));
    let mut buf = vec![0u8; buf_len];

    while remaining > 0 {
        let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let n = match src.read(&mut buf[..want]) {
            Ok(0) => {
                return CopyOutcome::ReadFailure(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file ended {remaining} bytes early"),
                ))
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return CopyOutcome::ReadFailure(e),
        };

        if let Err(e) = out.send(&buf[..n]) {
            return CopyOutcome::WriteFailure(e);
        }
        remaining -= n as u64;
        tracing::trace!(chunk = n, remaining, "sent content chunk");
    }

    CopyOutcome::Ok
}
