//! Byte-count progress notifications.
//!
//! Notifications fire every [`PROGRESS_NOTIFY_DELTA`] bytes and on the
//! `Init`/`Done` flags. Nothing is ever written to stdout, which carries the
//! protocol stream.

use crate::config::ProgressMode;
use std::io::Write;

/// Bytes between two `Normal` notifications.
pub const PROGRESS_NOTIFY_DELTA: u64 = 15 * 1000 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressFlag {
    Normal,
    Init,
    Done,
}

#[derive(Debug)]
pub struct Progress {
    mode: ProgressMode,
    total_size: Option<u64>,
    total: u64,
    prev_total: u64,
}

impl Progress {
    pub fn new(mode: ProgressMode, total_size: Option<u64>) -> Self {
        Self {
            mode,
            total_size,
            total: 0,
            prev_total: 0,
        }
    }

    /// Bytes accounted so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Account `size` more bytes. Returns whether a notification was emitted.
    pub fn notify(&mut self, size: u64, flag: ProgressFlag) -> bool {
        self.total += size;
        if self.total > self.prev_total + PROGRESS_NOTIFY_DELTA || flag != ProgressFlag::Normal {
            self.emit(flag);
            self.prev_total = self.total;
            return true;
        }
        false
    }

    fn emit(&self, flag: ProgressFlag) {
        match self.mode {
            ProgressMode::None => {}
            ProgressMode::Log => {
                tracing::info!(bytes = self.total, total = ?self.total_size, ?flag, "progress");
            }
            ProgressMode::Console => {
                let mut stderr = std::io::stderr().lock();
                let _ = stderr.write_all(self.console_line().as_bytes());
                if flag == ProgressFlag::Done {
                    let _ = stderr.write_all(b"\n");
                }
            }
        }
    }

    fn console_line(&self) -> String {
        match self.total_size {
            Some(size) => format!("sent {}/{} KB\r", self.total / 1024, size / 1024),
            None => format!("sent {} KB\r", self.total / 1024),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifies_every_delta() {
        let mut progress = Progress::new(ProgressMode::None, None);
        assert!(progress.notify(0, ProgressFlag::Init));
        assert!(!progress.notify(PROGRESS_NOTIFY_DELTA, ProgressFlag::Normal));
        assert!(progress.notify(1, ProgressFlag::Normal));
        assert!(!progress.notify(1000, ProgressFlag::Normal));
        assert!(progress.notify(0, ProgressFlag::Done));
        assert_eq!(progress.total(), PROGRESS_NOTIFY_DELTA + 1001);
    }

    #[test]
    fn test_console_line() {
        let mut progress = Progress::new(ProgressMode::None, Some(10 * 1024));
        progress.notify(4096, ProgressFlag::Normal);
        assert_eq!(progress.console_line(), "sent 4/10 KB\r");

        let progress = Progress::new(ProgressMode::None, None);
        assert_eq!(progress.console_line(), "sent 0 KB\r");
    }
}
