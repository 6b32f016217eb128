//! End-of-transfer handshake.
//!
//! After the last entry the sender writes the sentinel header, flushes, and
//! blocks for the receiver's [`ResultHeader`]. A nonzero error code is
//! reported before the checksum is looked at.

use crate::error::{Result, TransferError};
use crate::streaming::protocol::{FileHeader, ResultHeader, RESULT_HEADER_SIZE};
use crate::streaming::writer::StreamWriter;
use std::io::{Read, Write};

/// Write the end-of-transfer header. It is checksummed like any other header.
pub fn send_sentinel<W: Write>(out: &mut StreamWriter<W>) -> Result<()> {
    out.send_framing(&FileHeader::sentinel().encode())?;
    out.flush()
}

/// Block until the receiver's result record arrives.
pub fn read_result<R: Read>(input: &mut R) -> Result<ResultHeader> {
    let mut raw = [0u8; RESULT_HEADER_SIZE];
    input
        .read_exact(&mut raw)
        .map_err(TransferError::NoResult)?;
    Ok(ResultHeader::decode(&raw))
}

/// Check the receiver's verdict against the local checksum.
pub fn verify(result: &ResultHeader, local_crc: u32) -> Result<()> {
    if result.error_code != 0 {
        return Err(TransferError::remote(result.error_code));
    }
    if result.crc32 != local_crc {
        return Err(TransferError::ChecksumMismatch {
            local: local_crc,
            remote: result.crc32,
        });
    }
    Ok(())
}
