//! Work items scheduled by the scan
//!
//! Each item carries one absolute path and is consumed exactly once.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of scheduled work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorkKind {
    /// Read a directory's immediate entries
    #[serde(rename = "READ")]
    List,
    /// Stat a single path
    #[serde(rename = "STAT")]
    Inspect,
}

impl WorkKind {
    /// Label used by the observer hook and in logs
    pub fn label(&self) -> &'static str {
        match self {
            WorkKind::List => "READ",
            WorkKind::Inspect => "STAT",
        }
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A unit of scheduled work
///
/// Duplicate items for the same path are legal and independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// List the directory at this path
    List(PathBuf),
    /// Inspect (stat) this path
    Inspect(PathBuf),
}

impl WorkItem {
    pub fn kind(&self) -> WorkKind {
        match self {
            WorkItem::List(_) => WorkKind::List,
            WorkItem::Inspect(_) => WorkKind::Inspect,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            WorkItem::List(path) | WorkItem::Inspect(path) => path,
        }
    }
}
