//! Diagnostic hook for completed work items
//!
//! Observers are called outside the scheduler lock, once per completed
//! item (successful or not). They cannot influence scheduling.

use super::item::WorkKind;
use std::path::Path;
use tracing::debug;

/// Receives one call per completed work item
pub trait WorkObserver: Send + Sync {
    fn on_complete(&self, kind: WorkKind, path: &Path, info: &str);
}

impl<T> WorkObserver for T
where
    T: Fn(WorkKind, &Path, &str) + Send + Sync,
{
    fn on_complete(&self, kind: WorkKind, path: &Path, info: &str) {
        self(kind, path, info)
    }
}

/// Observer that writes each completion to the debug log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl WorkObserver for TracingObserver {
    fn on_complete(&self, kind: WorkKind, path: &Path, info: &str) {
        debug!("{} {} {}", kind, path.display(), info);
    }
}
