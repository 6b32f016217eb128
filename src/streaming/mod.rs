//! Sending half of the file copy protocol.
//!
//! # Architecture
//!
//! ```text
//! +-------------+     +---------------+     +--------------+
//! | TreeWalker  | --> | entry/content | --> | StreamWriter | --> stdout
//! | (per root)  |     |  (framing)    |     |  (+ CRC-32)  |
//! +-------------+     +---------------+     +--------------+
//!                                                  |
//!                        handshake: sentinel, then ResultHeader <-- stdin
//! ```
//!
//! Single-threaded and blocking. A stalled channel stalls the session.

pub mod checksum;
pub mod content;
pub mod entry;
pub mod handshake;
pub mod progress;
pub mod protocol;
pub mod session;
pub mod timestamp;
pub mod walker;
pub mod writer;

pub use checksum::RunningChecksum;
pub use content::{stream_content, CopyOutcome};
pub use entry::{send_entry, EntryMeta};
pub use progress::{Progress, ProgressFlag, PROGRESS_NOTIFY_DELTA};
pub use protocol::{
    EntryKind, FileHeader, FileType, ResultHeader, UnixTime, FILE_HEADER_SIZE,
    RESULT_HEADER_SIZE,
};
pub use session::{Session, SessionState};
pub use timestamp::{EntryTimes, NativeTime, UNIX_EPOCH_OFFSET};
pub use walker::{TreeWalker, WalkStats};
pub use writer::StreamWriter;
