//! Scan results
//!
//! [`Totals`] is the running aggregate mutated by completed inspections;
//! [`Report`] is the immutable record handed to the caller once the scan
//! resolves.

use super::fs::EntryKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Running totals for a scan in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub bytes: u64,
    pub files: u64,
    pub directories: u64,
}

impl Totals {
    /// Account for one inspected entry
    pub fn record(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::Directory => self.directories += 1,
            EntryKind::File { size } => {
                self.files += 1;
                self.bytes += size;
            }
            EntryKind::Other => {}
        }
    }
}

/// Final result of a completed scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Absolute root path that was scanned
    pub root: PathBuf,

    /// Concurrency ceiling used (0 = unbounded)
    pub limit: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Cumulative size of regular files in bytes
    pub bytes: u64,

    /// Regular files found below the root
    pub files: u64,

    /// Directories found below the root (the root itself is not counted)
    pub directories: u64,

    /// Peak number of work items in flight at once
    pub max_active: usize,
}

impl Report {
    pub(crate) fn new(
        root: PathBuf,
        limit: usize,
        started_at: DateTime<Utc>,
        totals: Totals,
        max_active: usize,
    ) -> Self {
        Self {
            root,
            limit,
            started_at,
            finished_at: Utc::now(),
            bytes: totals.bytes,
            files: totals.files,
            directories: totals.directories,
            max_active,
        }
    }

    /// The aggregate counters of this report
    pub fn totals(&self) -> Totals {
        Totals {
            bytes: self.bytes,
            files: self.files,
            directories: self.directories,
        }
    }

    /// Wall-clock time between start and completion
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Entries (files and directories) discovered per second
    pub fn items_per_second(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        if secs > 0.0 {
            (self.files + self.directories) as f64 / secs
        } else {
            0.0
        }
    }
}
