//! Tree walker for one transfer root.
//!
//! Walks with an explicit stack instead of recursion. A directory is visited
//! twice: on `Enter` its header is sent and its children are listed; on
//! `Leave`, after every descendant has been sent, its metadata is read again
//! and the header is sent a second time. Listing a directory can move its
//! access time, so the receiver applies the later header.
//!
//! Symbolic links are followed. A directory reached again through a link
//! while it is still being walked is a cycle and ends the walk.
//!
//! ```text
//! dir            <- Enter
//!   dir/a.txt
//!   dir/sub      <- Enter
//!   dir/sub      <- Leave
//! dir            <- Leave
//! ```

use crate::config::{ContentWriteFailure, SenderConfig};
use crate::error::{Result, TransferError};
use crate::path::TransferRoot;
use crate::streaming::content::{stream_content, CopyOutcome};
use crate::streaming::entry::{send_entry, wire_component, EntryMeta};
use crate::streaming::protocol::EntryKind;
use crate::streaming::writer::StreamWriter;
use std::fs::{self, File, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Counters for one or more walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs: u64,
    pub files: u64,
    pub content_bytes: u64,
}

enum Visit {
    /// Not yet sent. `parent` is the wire name of the containing directory.
    Enter {
        path: PathBuf,
        parent: Option<String>,
    },
    /// Children done; resend the directory header.
    Leave { path: PathBuf, name: String },
}

/// Identity of a directory, used to spot link cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DirId {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Canonical(PathBuf),
}

impl DirId {
    #[cfg(unix)]
    fn of(_path: &Path, meta: &Metadata) -> Result<Self> {
        use std::os::unix::fs::MetadataExt;
        Ok(DirId::Inode {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }

    #[cfg(not(unix))]
    fn of(path: &Path, _meta: &Metadata) -> Result<Self> {
        path.canonicalize()
            .map(DirId::Canonical)
            .map_err(|source| TransferError::Metadata {
                path: path.to_path_buf(),
                source,
            })
    }
}

pub struct TreeWalker<'a, W: Write> {
    out: &'a mut StreamWriter<W>,
    config: &'a SenderConfig,
    stats: WalkStats,
    /// Directories entered but not yet left, outermost first.
    ancestors: Vec<DirId>,
}

impl<'a, W: Write> TreeWalker<'a, W> {
    pub fn new(out: &'a mut StreamWriter<W>, config: &'a SenderConfig) -> Self {
        Self {
            out,
            config,
            stats: WalkStats::default(),
            ancestors: Vec::new(),
        }
    }

    /// Send `root` and everything below it.
    pub fn walk(mut self, root: &TransferRoot) -> Result<WalkStats> {
        let mut stack = vec![Visit::Enter {
            path: root.path(),
            parent: None,
        }];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter { path, parent } => {
                    let component = wire_component(&path)?;
                    let name = match parent {
                        Some(parent) => format!("{parent}/{component}"),
                        None => component.to_string(),
                    };

                    if self.enter(&path, &name)? == EntryKind::Directory {
                        let children = list_children(&path)?;
                        stack.push(Visit::Leave {
                            path,
                            name: name.clone(),
                        });
                        // Reversed so the stack pops them in listing order.
                        stack.extend(children.into_iter().rev().map(|child| Visit::Enter {
                            path: child,
                            parent: Some(name.clone()),
                        }));
                    }
                }
                Visit::Leave { path, name } => {
                    self.ancestors.pop();
                    let meta = EntryMeta::from_metadata(&path, &stat(&path)?)?;
                    send_entry(self.out, &meta, &name)?;
                }
            }
        }

        Ok(self.stats)
    }

    fn enter(&mut self, path: &Path, name: &str) -> Result<EntryKind> {
        let fs_meta = stat(path)?;
        let meta = EntryMeta::from_metadata(path, &fs_meta)?;
        match meta.kind {
            EntryKind::Directory => {
                let id = DirId::of(path, &fs_meta)?;
                if self.ancestors.contains(&id) {
                    return Err(TransferError::DirectoryCycle {
                        path: path.to_path_buf(),
                    });
                }
                send_entry(self.out, &meta, name)?;
                self.ancestors.push(id);
                self.stats.dirs += 1;
            }
            EntryKind::Regular => self.send_file(path, name)?,
        }
        Ok(meta.kind)
    }

    fn send_file(&mut self, path: &Path, name: &str) -> Result<()> {
        let mut file = File::open(path).map_err(|source| TransferError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let meta = file.metadata().map_err(|source| TransferError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        let meta = EntryMeta::from_metadata(path, &meta)?;
        let header = send_entry(self.out, &meta, name)?;

        match stream_content(&mut file, header.filelen, self.out, self.config.chunk_size) {
            CopyOutcome::Ok => {}
            CopyOutcome::ReadFailure(source) => {
                return Err(TransferError::ReadContent {
                    path: path.to_path_buf(),
                    source,
                })
            }
            CopyOutcome::WriteFailure(source) => {
                return Err(TransferError::ContentWrite {
                    path: path.to_path_buf(),
                    deferred: self.config.content_write_failure == ContentWriteFailure::Defer,
                    source,
                })
            }
        }

        self.stats.files += 1;
        self.stats.content_bytes += header.filelen;
        Ok(())
    }
}

/// Metadata for an entry, following symbolic links.
fn stat(path: &Path) -> Result<Metadata> {
    fs::metadata(path).map_err(|source| TransferError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Children of `dir` in the order the filesystem returns them.
///
/// The listing handle is closed before this returns.
fn list_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let list_err = |source| TransferError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    fs::read_dir(dir)
        .map_err(list_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(list_err))
        .collect()
}
