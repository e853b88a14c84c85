//! Work item execution
//!
//! Executing an item never touches scheduler state directly. It returns a
//! [`Completion`] describing its effects, which the scheduler applies under
//! its own lock.

use super::fs::{EntryKind, FileSystem};
use super::item::WorkItem;
use std::io;

/// Effects of one successfully executed work item
#[derive(Debug, Default)]
pub(crate) struct Completion {
    /// Items to enqueue
    pub follow_ups: Vec<WorkItem>,

    /// Entry found by an inspection, to be counted
    pub found: Option<EntryKind>,

    /// Info string for the observer hook
    pub info: String,
}

/// Run one work item against the filesystem. With `follow_links`, an
/// inspection resolves symlinks (used for the root only).
pub(crate) async fn execute<F: FileSystem>(
    fs: &F,
    item: &WorkItem,
    follow_links: bool,
) -> io::Result<Completion> {
    match item {
        WorkItem::Inspect(path) => {
            let kind = if follow_links {
                fs.metadata(path).await?
            } else {
                fs.stat(path).await?
            };
            let follow_ups = if kind.is_dir() {
                vec![WorkItem::List(path.clone())]
            } else {
                Vec::new()
            };

            Ok(Completion {
                follow_ups,
                found: Some(kind),
                info: kind.describe(),
            })
        }
        WorkItem::List(path) => {
            let names = fs.read_dir(path).await?;
            let info = format!("{} entries", names.len());
            let follow_ups = names
                .into_iter()
                .map(|name| WorkItem::Inspect(path.join(name)))
                .collect();

            Ok(Completion {
                follow_ups,
                found: None,
                info,
            })
        }
    }
}
