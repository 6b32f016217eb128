//! Running CRC-32 over the outgoing stream.
//!
//! Standard reflected CRC-32 (polynomial 0xEDB88320), chained across calls
//! the same way the receiving half accumulates it.

use crc32fast::Hasher;

/// Checksum accumulated over every byte sent in a session.
///
/// There is no reset: one value lives for the whole session.
#[derive(Clone, Default)]
pub struct RunningChecksum {
    hasher: Hasher,
}

impl RunningChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Current value. Reading it does not disturb accumulation.
    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

impl std::fmt::Debug for RunningChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RunningChecksum({:#010x})", self.value())
    }
}
