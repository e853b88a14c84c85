//! Filesystem access for work items
//!
//! The scheduler only ever needs two operations: stat a path and list a
//! directory's names. Both go through [`FileSystem`] so the scan can run
//! against the local disk ([`LocalFs`]) or against a fake in tests.

use std::ffi::OsString;
use std::fs::FileType;
use std::future::Future;
use std::io;
use std::path::Path;

/// Type of filesystem entry, as far as disk usage is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory
    Directory,
    /// Regular file with its size in bytes
    File { size: u64 },
    /// Symlinks, devices, sockets, FIFOs: counted in no total
    Other,
}

impl EntryKind {
    /// Classify a file type without following symlinks
    pub fn from_file_type(file_type: FileType, len: u64) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File { size: len }
        } else {
            EntryKind::Other
        }
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryKind::Directory
    }

    /// Short description for the observer hook
    pub fn describe(&self) -> String {
        match self {
            EntryKind::Directory => "dir".to_string(),
            EntryKind::File { size } => format!("file {} bytes", size),
            EntryKind::Other => "other".to_string(),
        }
    }
}

/// Async filesystem operations used by the scheduler
///
/// Implementations must be shareable across spawned tasks.
pub trait FileSystem: Send + Sync + 'static {
    /// Stat `path` without following a final symlink
    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<EntryKind>> + Send;

    /// Names of the immediate entries of the directory at `path`
    fn read_dir(&self, path: &Path) -> impl Future<Output = io::Result<Vec<OsString>>> + Send;

    /// Stat `path`, following symlinks. Only used for the scan root.
    fn metadata(&self, path: &Path) -> impl Future<Output = io::Result<EntryKind>> + Send {
        self.stat(path)
    }
}

/// The local filesystem, via `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    async fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = tokio::fs::symlink_metadata(path).await?;
        Ok(EntryKind::from_file_type(meta.file_type(), meta.len()))
    }

    async fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = tokio::fs::metadata(path).await?;
        Ok(EntryKind::from_file_type(meta.file_type(), meta.len()))
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let mut dir = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name());
        }
        Ok(names)
    }
}
