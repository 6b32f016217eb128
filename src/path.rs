//! Command-line path arguments.
//!
//! Each argument is split into the directory that contains it and its final
//! component. Only the final component and what lies below it is ever named
//! on the wire.

use crate::error::{Result, TransferError};
use std::path::{Path, PathBuf};

/// One argument, ready to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRoot {
    /// Directory containing the argument.
    pub base: PathBuf,
    /// The argument's final component, as sent on the wire.
    pub name: String,
}

impl TransferRoot {
    /// Filesystem location of the argument itself.
    pub fn path(&self) -> PathBuf {
        self.base.join(&self.name)
    }
}

/// Resolve `arg` against `cwd` and split it into base directory and name.
///
/// Trailing separators and `.` components are dropped; a trailing `..` is
/// resolved through the filesystem. The root directory cannot be sent.
pub fn resolve_argument(cwd: &Path, arg: &Path) -> Result<TransferRoot> {
    let absolute = if arg.is_absolute() {
        arg.to_path_buf()
    } else {
        cwd.join(arg)
    };

    let absolute = match absolute.file_name() {
        Some(_) => absolute,
        None => absolute
            .canonicalize()
            .map_err(|e| TransferError::Argument {
                path: arg.to_path_buf(),
                reason: e.to_string(),
            })?,
    };

    let (Some(name), Some(base)) = (absolute.file_name(), absolute.parent()) else {
        return Err(TransferError::Argument {
            path: arg.to_path_buf(),
            reason: "no final path component".to_string(),
        });
    };

    let name = name
        .to_str()
        .ok_or_else(|| TransferError::InvalidName {
            path: absolute.clone(),
        })?
        .to_string();

    Ok(TransferRoot {
        base: base.to_path_buf(),
        name,
    })
}
