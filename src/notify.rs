//! Presentation of fatal errors.

use crate::error::TransferError;
use std::io::Write;

/// Shows a fatal message to the user. The caller exits afterwards.
pub trait FatalNotifier {
    fn notify(&self, message: &str);
}

/// Writes `filecopy-agent: <message>` to stderr.
pub struct StderrNotifier;

impl FatalNotifier for StderrNotifier {
    fn notify(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}: {}", env!("CARGO_PKG_NAME"), message);
    }
}

/// Present `err` unless the receiver owns its diagnostic; returns the exit status.
pub fn report(err: &TransferError, notifier: &dyn FatalNotifier) -> i32 {
    if err.is_deferred() {
        tracing::debug!(error = %err, "leaving diagnostic to the receiver");
    } else {
        notifier.notify(&err.to_string());
    }
    err.exit_code()
}
