//! Entry encoding: header plus name, checksummed through the writer.

use crate::error::{Result, TransferError};
use crate::streaming::protocol::{EntryKind, FileHeader};
use crate::streaming::timestamp::EntryTimes;
use crate::streaming::writer::StreamWriter;
use std::fs::Metadata;
use std::io::Write;
use std::path::Path;

/// What the header needs to know about one filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub kind: EntryKind,
    /// Content length; ignored for directories.
    pub len: u64,
    pub times: EntryTimes,
}

impl EntryMeta {
    pub fn from_metadata(path: &Path, meta: &Metadata) -> Result<Self> {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::Regular
        } else {
            return Err(TransferError::UnsupportedType {
                path: path.to_path_buf(),
            });
        };
        Ok(Self {
            kind,
            len: meta.len(),
            times: EntryTimes::from_metadata(meta),
        })
    }

    pub fn header(&self) -> FileHeader {
        FileHeader::new(self.kind, self.len, self.times.atime, self.times.mtime)
    }
}

/// The UTF-8 form of a final path component.
pub fn wire_component(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| TransferError::InvalidName {
            path: path.to_path_buf(),
        })
}

/// Send the header for `meta` followed by `name`.
///
/// Failures are framing failures: the receiver cannot resynchronize.
pub fn send_entry<W: Write>(
    out: &mut StreamWriter<W>,
    meta: &EntryMeta,
    name: &str,
) -> Result<FileHeader> {
    let header = meta.header().with_name(name)?;
    out.send_framing(&header.encode())?;
    out.send_framing(name.as_bytes())?;
    tracing::debug!(
        name,
        mode = header.mode,
        filelen = header.filelen,
        "sent entry header"
    );
    Ok(header)
}
