//! Conversion between native file times and wire timestamps.
//!
//! Native times are counted in 100 ns ticks since 1601-01-01. The wire carries
//! Unix seconds plus a nanosecond remainder, shifted by [`UNIX_EPOCH_OFFSET`].
//! The offset must match the receiving half exactly, so it is kept as-is.

use crate::streaming::protocol::UnixTime;
use filetime::FileTime;
use std::fs::Metadata;

/// Seconds between the native epoch and the Unix epoch used by the protocol.
pub const UNIX_EPOCH_OFFSET: u64 = 11_644_478_640;

/// Native ticks per second.
pub const TICKS_PER_SEC: u64 = 10_000_000;

/// Nanoseconds per native tick.
pub const NSEC_PER_TICK: u64 = 100;

/// Last native second that still fits the 32-bit wire field.
const MAX_NATIVE_SECS: u64 = UNIX_EPOCH_OFFSET + u32::MAX as u64;

/// A native timestamp: 100 ns ticks since 1601-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NativeTime(pub u64);

impl NativeTime {
    /// Split into wire seconds and nanoseconds.
    ///
    /// Times before the Unix epoch clamp to zero, times past 2106 to
    /// `u32::MAX`. A clamped time carries no nanoseconds.
    pub fn to_unix(self) -> UnixTime {
        let secs = self.0 / TICKS_PER_SEC;
        if secs < UNIX_EPOCH_OFFSET {
            return UnixTime::default();
        }
        match u32::try_from(secs - UNIX_EPOCH_OFFSET) {
            Ok(secs) => UnixTime {
                secs,
                nsec: ((self.0 % TICKS_PER_SEC) * NSEC_PER_TICK) as u32,
            },
            Err(_) => UnixTime {
                secs: u32::MAX,
                nsec: 0,
            },
        }
    }

    /// Inverse of [`NativeTime::to_unix`]; sub-tick nanoseconds are truncated.
    pub fn from_unix(time: UnixTime) -> Self {
        let secs = u64::from(time.secs) + UNIX_EPOCH_OFFSET;
        NativeTime(secs * TICKS_PER_SEC + u64::from(time.nsec) / NSEC_PER_TICK)
    }

    /// Native seconds plus nanoseconds, capped at the last wire second so
    /// the tick count cannot overflow.
    fn from_parts(secs: u64, nanos: u32) -> Self {
        if secs > MAX_NATIVE_SECS {
            return NativeTime(MAX_NATIVE_SECS * TICKS_PER_SEC);
        }
        NativeTime(secs * TICKS_PER_SEC + u64::from(nanos) / NSEC_PER_TICK)
    }

    #[cfg(windows)]
    fn from_file_time(ft: FileTime) -> Self {
        // On Windows `FileTime::seconds` already counts from 1601-01-01.
        match u64::try_from(ft.seconds()) {
            Ok(secs) => Self::from_parts(secs, ft.nanoseconds()),
            Err(_) => NativeTime(0),
        }
    }

    #[cfg(not(windows))]
    fn from_file_time(ft: FileTime) -> Self {
        match u64::try_from(ft.unix_seconds()) {
            Ok(secs) => {
                Self::from_parts(secs.saturating_add(UNIX_EPOCH_OFFSET), ft.nanoseconds())
            }
            Err(_) => NativeTime(0),
        }
    }
}

/// Access and modification times of an entry, ready for the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTimes {
    pub atime: UnixTime,
    pub mtime: UnixTime,
}

impl EntryTimes {
    pub fn from_metadata(meta: &Metadata) -> Self {
        let atime = NativeTime::from_file_time(FileTime::from_last_access_time(meta));
        let mtime = NativeTime::from_file_time(FileTime::from_last_modification_time(meta));
        Self {
            atime: atime.to_unix(),
            mtime: mtime.to_unix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_epoch_offset_maps_to_zero() {
        let t = NativeTime(UNIX_EPOCH_OFFSET * TICKS_PER_SEC).to_unix();
        assert_eq!(t, UnixTime { secs: 0, nsec: 0 });
    }

    #[test]
    fn test_sub_second_remainder_scaled() {
        let ticks = (UNIX_EPOCH_OFFSET + 42) * TICKS_PER_SEC + 1_234_567;
        let t = NativeTime(ticks).to_unix();
        assert_eq!(t.secs, 42);
        assert_eq!(t.nsec, 123_456_700);
    }

    #[test]
    fn test_before_unix_epoch_clamps() {
        assert_eq!(NativeTime(0).to_unix().secs, 0);
    }

    #[test]
    fn test_far_future_clamps() {
        assert_eq!(
            NativeTime(u64::MAX).to_unix(),
            UnixTime {
                secs: u32::MAX,
                nsec: 0
            }
        );
    }

    #[test]
    fn test_file_time_past_wire_range_saturates() {
        let ft = FileTime::from_unix_time(2_000_000_000_000, 0);
        assert_eq!(
            NativeTime::from_file_time(ft).to_unix(),
            UnixTime {
                secs: u32::MAX,
                nsec: 0
            }
        );

        let ft = FileTime::from_unix_time(1 << 60, 999_999_999);
        assert_eq!(NativeTime::from_file_time(ft).to_unix().secs, u32::MAX);
    }

    #[test]
    fn test_file_time_before_unix_epoch_is_zero() {
        let ft = FileTime::from_unix_time(-5, 500_000_000);
        assert_eq!(NativeTime::from_file_time(ft).to_unix(), UnixTime::default());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_metadata_far_future_mtime_saturates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("future.txt");
        std::fs::write(&path, "test").unwrap();

        let mtime = FileTime::from_unix_time(2_000_000_000_000, 0);
        if filetime::set_file_mtime(&path, mtime).is_err() {
            // Filesystem cannot store the time.
            return;
        }

        let times = EntryTimes::from_metadata(&std::fs::metadata(&path).unwrap());
        assert_eq!(times.mtime.secs, u32::MAX);
        assert_eq!(times.mtime.nsec, 0);
    }

    #[test]
    fn test_metadata_times_are_exact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.txt");
        std::fs::write(&path, "test").unwrap();

        let mtime = FileTime::from_unix_time(1_700_000_000, 123_456_700);
        filetime::set_file_mtime(&path, mtime).unwrap();

        let times = EntryTimes::from_metadata(&std::fs::metadata(&path).unwrap());
        assert_eq!(
            times.mtime,
            UnixTime {
                secs: 1_700_000_000,
                nsec: 123_456_700
            }
        );
    }

    proptest! {
        #[test]
        fn prop_unix_roundtrip(secs in any::<u32>(), ticks in 0u32..10_000_000) {
            let time = UnixTime { secs, nsec: ticks * 100 };
            prop_assert_eq!(NativeTime::from_unix(time).to_unix(), time);
        }

        #[test]
        fn prop_native_roundtrip(
            secs in UNIX_EPOCH_OFFSET..UNIX_EPOCH_OFFSET + u64::from(u32::MAX),
            sub in 0u64..TICKS_PER_SEC,
        ) {
            let native = NativeTime(secs * TICKS_PER_SEC + sub);
            prop_assert_eq!(NativeTime::from_unix(native.to_unix()), native);
        }
    }
}
