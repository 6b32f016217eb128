//! Wire records for the file copy protocol.
//!
//! The stream is a sequence of entries, each one a fixed [`FileHeader`]
//! followed by the UTF-8 name and, for regular files, the content bytes.
//! An all-zero header terminates the stream; the receiver then answers with a
//! single [`ResultHeader`].
//!
//! Wire format: all multi-byte integers are little-endian, no padding.
//!
//! ```text
//! FileHeader (32 bytes)
//! namelen:u32 | mode:u32 | filelen:u64 | atime:u32 | atime_nsec:u32 | mtime:u32 | mtime_nsec:u32
//!
//! ResultHeader (8 bytes)
//! error_code:u32 | crc32:u32
//! ```

use crate::error::{Result, TransferError};
use bytes::{Buf, BufMut};

/// Size of an encoded [`FileHeader`].
pub const FILE_HEADER_SIZE: usize = 32;

/// Size of an encoded [`ResultHeader`].
pub const RESULT_HEADER_SIZE: usize = 8;

// =============================================================================
// Mode bits
// =============================================================================

bitflags::bitflags! {
    /// File type bits of the `mode` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileType: u32 {
        const DIR = 0o040000;
        const REGULAR = 0o100000;
    }
}

/// Mask selecting the type bits of a mode.
pub const S_IFMT: u32 = 0o170000;

/// Permission bits sent for directories.
pub const DIR_PERMISSIONS: u32 = 0o755;

/// Permission bits sent for regular files.
pub const FILE_PERMISSIONS: u32 = 0o644;

/// Kind of entry carried by a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Regular,
}

impl EntryKind {
    /// Full `mode` value for this kind of entry.
    pub fn mode(self) -> u32 {
        match self {
            EntryKind::Directory => FileType::DIR.bits() | DIR_PERMISSIONS,
            EntryKind::Regular => FileType::REGULAR.bits() | FILE_PERMISSIONS,
        }
    }

    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode & S_IFMT {
            m if m == FileType::DIR.bits() => Some(EntryKind::Directory),
            m if m == FileType::REGULAR.bits() => Some(EntryKind::Regular),
            _ => None,
        }
    }
}

// =============================================================================
// Unix timestamps
// =============================================================================

/// Seconds and nanosecond remainder since the Unix epoch, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnixTime {
    pub secs: u32,
    pub nsec: u32,
}

// =============================================================================
// FileHeader
// =============================================================================

/// Fixed-size record preceding every entry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileHeader {
    pub namelen: u32,
    pub mode: u32,
    pub filelen: u64,
    pub atime: u32,
    pub atime_nsec: u32,
    pub mtime: u32,
    pub mtime_nsec: u32,
}

impl FileHeader {
    /// Header for an entry; `namelen` is filled in when the name is encoded.
    pub fn new(kind: EntryKind, filelen: u64, atime: UnixTime, mtime: UnixTime) -> Self {
        Self {
            namelen: 0,
            mode: kind.mode(),
            filelen: match kind {
                EntryKind::Directory => 0,
                EntryKind::Regular => filelen,
            },
            atime: atime.secs,
            atime_nsec: atime.nsec,
            mtime: mtime.secs,
            mtime_nsec: mtime.nsec,
        }
    }

    /// The end-of-transfer record: every field zero.
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_sentinel(&self) -> bool {
        self.namelen == 0 && self.filelen == 0
    }

    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::from_mode(self.mode)
    }

    /// Set `namelen` to the byte length of `name`.
    pub fn with_name(mut self, name: &str) -> Result<Self> {
        self.namelen = u32::try_from(name.len()).map_err(|_| TransferError::FieldOverflow {
            field: "namelen",
            value: name.len() as u64,
        })?;
        Ok(self)
    }

    pub fn encode(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        let mut out = &mut buf[..];
        out.put_u32_le(self.namelen);
        out.put_u32_le(self.mode);
        out.put_u64_le(self.filelen);
        out.put_u32_le(self.atime);
        out.put_u32_le(self.atime_nsec);
        out.put_u32_le(self.mtime);
        out.put_u32_le(self.mtime_nsec);
        buf
    }

    pub fn decode(mut raw: &[u8]) -> Result<Self> {
        if raw.remaining() < FILE_HEADER_SIZE {
            return Err(TransferError::Internal(format!(
                "file header truncated: {} of {} bytes",
                raw.remaining(),
                FILE_HEADER_SIZE
            )));
        }
        Ok(Self {
            namelen: raw.get_u32_le(),
            mode: raw.get_u32_le(),
            filelen: raw.get_u64_le(),
            atime: raw.get_u32_le(),
            atime_nsec: raw.get_u32_le(),
            mtime: raw.get_u32_le(),
            mtime_nsec: raw.get_u32_le(),
        })
    }
}

// =============================================================================
// ResultHeader
// =============================================================================

/// The receiver's single reply after the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultHeader {
    /// `0` on success, otherwise an `errno` value from the receiver.
    pub error_code: u32,
    /// The receiver's running CRC-32 over everything it read.
    pub crc32: u32,
}

impl ResultHeader {
    pub fn encode(&self) -> [u8; RESULT_HEADER_SIZE] {
        let mut buf = [0u8; RESULT_HEADER_SIZE];
        let mut out = &mut buf[..];
        out.put_u32_le(self.error_code);
        out.put_u32_le(self.crc32);
        buf
    }

    pub fn decode(raw: &[u8; RESULT_HEADER_SIZE]) -> Self {
        let mut raw = &raw[..];
        Self {
            error_code: raw.get_u32_le(),
            crc32: raw.get_u32_le(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mode_values() {
        assert_eq!(EntryKind::Directory.mode(), 0o040755);
        assert_eq!(EntryKind::Regular.mode(), 0o100644);
        assert_eq!(EntryKind::from_mode(0o040755), Some(EntryKind::Directory));
        assert_eq!(EntryKind::from_mode(0o100600), Some(EntryKind::Regular));
        assert_eq!(EntryKind::from_mode(0o120777), None);
    }

    #[test]
    fn test_directory_header_has_no_length() {
        let hdr = FileHeader::new(
            EntryKind::Directory,
            4096,
            UnixTime::default(),
            UnixTime::default(),
        );
        assert_eq!(hdr.filelen, 0);
    }

    #[test]
    fn test_header_layout() {
        let hdr = FileHeader {
            namelen: 10,
            mode: 0o100644,
            filelen: 4,
            atime: 0x01020304,
            atime_nsec: 5,
            mtime: 0x0a0b0c0d,
            mtime_nsec: 6,
        };
        let raw = hdr.encode();

        assert_eq!(&raw[0..4], &[10, 0, 0, 0]);
        assert_eq!(&raw[4..8], &0o100644u32.to_le_bytes());
        assert_eq!(&raw[8..16], &[4, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&raw[16..20], &[4, 3, 2, 1]);
        assert_eq!(&raw[24..28], &[0x0d, 0x0c, 0x0b, 0x0a]);
        assert_eq!(&raw[28..32], &[6, 0, 0, 0]);
    }

    #[test]
    fn test_sentinel_is_all_zero() {
        let sentinel = FileHeader::sentinel();
        assert!(sentinel.is_sentinel());
        assert_eq!(sentinel.encode(), [0u8; FILE_HEADER_SIZE]);
    }

    #[test]
    fn test_namelen_counts_utf8_bytes() {
        let hdr = FileHeader::sentinel().with_name("répertoire/日本").unwrap();
        assert_eq!(hdr.namelen as usize, "répertoire/日本".len());
        assert_eq!(hdr.namelen, 18);
    }

    #[test]
    fn test_decode_rejects_short_input() {
        assert!(FileHeader::decode(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_result_header_layout() {
        let result = ResultHeader {
            error_code: 5,
            crc32: 0xCBF43926,
        };
        let raw = result.encode();
        assert_eq!(raw, [5, 0, 0, 0, 0x26, 0x39, 0xF4, 0xCB]);
        assert_eq!(ResultHeader::decode(&raw), result);
    }

    proptest! {
        #[test]
        fn prop_header_decodes_to_itself(
            namelen in any::<u32>(),
            mode in any::<u32>(),
            filelen in any::<u64>(),
            atime in any::<u32>(),
            mtime in any::<u32>(),
            nsec in 0u32..1_000_000_000,
        ) {
            let hdr = FileHeader {
                namelen,
                mode,
                filelen,
                atime,
                atime_nsec: nsec,
                mtime,
                mtime_nsec: nsec,
            };
            prop_assert_eq!(FileHeader::decode(&hdr.encode()).unwrap(), hdr);
        }
    }
}
