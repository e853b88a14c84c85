//! Error types for throttled-du
//!
//! This module defines the error hierarchy that covers:
//! - Root path validation failures
//! - Filesystem errors raised by work items during a scan
//! - Experiment configuration errors ([`ConfigError`], CLI side only)
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - A scan surfaces exactly one error: the first one observed
//! - Preserve the underlying `io::Error` as the source for debugging

use crate::scheduler::WorkKind;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a scan
#[derive(Error, Debug)]
pub enum ScanError {
    /// Root path missing or not a directory
    #[error("Invalid root '{}': {reason}", path.display())]
    InvalidArgument { path: PathBuf, reason: String },

    /// A stat or directory read failed during the traversal
    #[error("{op} failed for '{}': {source}", path.display())]
    Traversal {
        op: WorkKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scheduler dropped the outcome without resolving it
    #[error("Scan ended without producing a result")]
    Abandoned,
}

impl ScanError {
    /// Wrap a filesystem error raised by a work item
    pub fn traversal(op: WorkKind, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Traversal {
            op,
            path: path.into(),
            source,
        }
    }

    /// Returns true if the root path was rejected
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ScanError::InvalidArgument { .. })
    }

    /// The underlying I/O error kind, if this error wraps one
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            ScanError::Traversal { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// The path associated with this error, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ScanError::InvalidArgument { path, .. } => Some(path),
            ScanError::Traversal { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No concurrency limits to run
    #[error("At least one concurrency limit is required")]
    NoLimits,

    /// Concurrency limit out of range
    #[error("Invalid concurrency limit {limit}: must be at most {max} (0 = unbounded)")]
    InvalidLimit { limit: usize, max: usize },

    /// Invalid run count
    #[error("Invalid run count {runs}: must be at least 1")]
    InvalidRuns { runs: usize },

    /// Root path could not be made absolute
    #[error("Invalid root path '{}': {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },
}

/// Result type alias for ScanError
pub type Result<T> = std::result::Result<T, ScanError>;
