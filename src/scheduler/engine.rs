//! Bounded-concurrency scan scheduler
//!
//! The scheduler owns a self-growing stack of [`WorkItem`]s. Every state
//! change (seed, launch, completion) runs `step`, which either
//! launches more work, waits for an in-flight completion to call it again,
//! or resolves the outcome. Nothing polls: completions drive the loop.
//!
//! ```text
//!   seed Inspect(root)
//!          │
//!          ▼
//!   ┌──────────────┐  pop + spawn   ┌───────────────────┐
//!   │   pending    │ ─────────────► │ in-flight (active)│
//!   │ (Vec stack)  │ ◄───────────── │  stat / read_dir  │
//!   └──────────────┘   follow-ups   └───────────────────┘
//!          │                                 │
//!          └──── empty && active == 0 ───────┴──► Report
//! ```
//!
//! All bookkeeping (`pending`, `active`, totals, outcome) sits behind a
//! single mutex that is never held across an `.await`.

use super::execute::{execute, Completion};
use super::fs::{EntryKind, FileSystem, LocalFs};
use super::item::{WorkItem, WorkKind};
use super::observer::WorkObserver;
use super::report::{Report, Totals};
use crate::error::{Result, ScanError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What happens to in-flight work after the first failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cancellation {
    /// Stop launching, wait for in-flight items, then report the error
    #[default]
    Drain,
    /// Report the error immediately; in-flight items finish unobserved
    BestEffort,
}

/// Scan a directory tree with at most `limit` concurrent filesystem
/// operations (`0` = unbounded)
pub async fn run(root: impl Into<PathBuf>, limit: usize) -> Result<Report> {
    Scheduler::new(root, limit).run().await
}

/// Configurable scan over a filesystem
pub struct Scheduler<F = LocalFs> {
    fs: F,
    root: PathBuf,
    limit: usize,
    cancellation: Cancellation,
    observer: Option<Arc<dyn WorkObserver>>,
}

impl Scheduler<LocalFs> {
    /// Scan `root` on the local filesystem
    pub fn new(root: impl Into<PathBuf>, limit: usize) -> Self {
        Self::with_fs(LocalFs, root, limit)
    }
}

impl<F: FileSystem> Scheduler<F> {
    /// Scan `root` on the given filesystem
    pub fn with_fs(fs: F, root: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            fs,
            root: root.into(),
            limit,
            cancellation: Cancellation::default(),
            observer: None,
        }
    }

    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Install a hook called once per completed work item
    pub fn observer(mut self, observer: impl WorkObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Run the scan to completion
    ///
    /// Must be called from within a tokio runtime.
    pub async fn run(self) -> Result<Report> {
        let root = std::path::absolute(&self.root).map_err(|e| ScanError::InvalidArgument {
            path: self.root.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            root = %root.display(),
            limit = self.limit,
            cancellation = ?self.cancellation,
            "Starting scan"
        );

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let core = Arc::new(Core {
            fs: self.fs,
            state: Mutex::new(State {
                pending: vec![WorkItem::Inspect(root.clone())],
                active: 0,
                max_active: 0,
                totals: Totals::default(),
                failure: None,
                outcome: Some(outcome_tx),
                started_at: Utc::now(),
            }),
            root,
            limit: self.limit,
            cancellation: self.cancellation,
            observer: self.observer,
        });

        core.step();
        drop(core);

        // A dropped sender means every task holding the core went away
        // without resolving (a panicking task or observer).
        outcome_rx.await.unwrap_or(Err(ScanError::Abandoned))
    }
}

/// Shared scheduler core, referenced by every in-flight task
struct Core<F> {
    fs: F,
    root: PathBuf,
    limit: usize,
    cancellation: Cancellation,
    observer: Option<Arc<dyn WorkObserver>>,
    state: Mutex<State>,
}

/// Mutable bookkeeping, only touched under the core's lock
struct State {
    pending: Vec<WorkItem>,
    active: usize,
    max_active: usize,
    totals: Totals,
    failure: Option<ScanError>,
    outcome: Option<oneshot::Sender<Result<Report>>>,
    started_at: DateTime<Utc>,
}

impl State {
    /// Resolve the outcome; later calls are no-ops
    fn resolve(&mut self, result: Result<Report>) {
        if let Some(tx) = self.outcome.take() {
            // The caller may have stopped waiting
            let _ = tx.send(result);
        }
    }

    fn is_resolved(&self) -> bool {
        self.outcome.is_none()
    }
}

impl<F: FileSystem> Core<F> {
    /// Launch, wait, or resolve. Loops instead of recursing after a launch
    /// so the concurrency ceiling fills eagerly.
    fn step(self: &Arc<Self>) {
        loop {
            let item = {
                let mut state = self.state.lock();

                if state.is_resolved() {
                    return;
                }

                if state.failure.is_some() {
                    if state.active == 0 || self.cancellation == Cancellation::BestEffort {
                        if let Some(err) = state.failure.take() {
                            warn!(active = state.active, error = %err, "Scan failed");
                            state.resolve(Err(err));
                        }
                    }
                    return;
                }

                if self.limit > 0 && state.active >= self.limit {
                    return;
                }

                match state.pending.pop() {
                    Some(item) => {
                        state.active += 1;
                        state.max_active = state.max_active.max(state.active);
                        item
                    }
                    None => {
                        if state.active == 0 {
                            let report = Report::new(
                                self.root.clone(),
                                self.limit,
                                state.started_at,
                                state.totals,
                                state.max_active,
                            );
                            debug!(
                                files = report.files,
                                dirs = report.directories,
                                bytes = report.bytes,
                                max_active = report.max_active,
                                duration_ms = report.duration().as_millis() as u64,
                                "Scan completed"
                            );
                            state.resolve(Ok(report));
                        }
                        return;
                    }
                }
            };

            let core = Arc::clone(self);
            tokio::spawn(async move { core.complete(item).await });
        }
    }

    /// Execute one item, apply its effects, and step again
    async fn complete(self: Arc<Self>, item: WorkItem) {
        let result = execute(&self.fs, &item, self.is_root(&item)).await;
        let info = match &result {
            Ok(done) => done.info.clone(),
            Err(e) => e.to_string(),
        };
        let result = self.settle(&item, result);

        {
            let mut state = self.state.lock();
            state.active -= 1;

            match result {
                Ok(done) => {
                    if let Some(kind) = done.found {
                        state.totals.record(kind);
                    }
                    state.pending.extend(done.follow_ups);
                }
                Err(err) => {
                    if state.failure.is_none() && !state.is_resolved() {
                        state.failure = Some(err);
                    } else {
                        debug!(error = %err, "Discarding error after first failure");
                    }
                }
            }
        }

        if let Some(observer) = &self.observer {
            observer.on_complete(item.kind(), item.path(), &info);
        }

        self.step();
    }

    /// Map a raw execution result to scan semantics. The seeded
    /// inspection of the root validates it and is not counted.
    fn settle(&self, item: &WorkItem, result: io::Result<Completion>) -> Result<Completion> {
        if !self.is_root(item) {
            return result.map_err(|e| ScanError::traversal(item.kind(), item.path(), e));
        }

        match result {
            Ok(mut done) if done.found == Some(EntryKind::Directory) => {
                done.found = None;
                Ok(done)
            }
            Ok(_) => Err(invalid_root(&self.root, "not a directory")),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(invalid_root(&self.root, "does not exist"))
            }
            Err(e) => Err(ScanError::traversal(WorkKind::Inspect, &self.root, e)),
        }
    }
}

impl<F> Core<F> {
    /// The seeded inspection of the root path
    fn is_root(&self, item: &WorkItem) -> bool {
        item.kind() == WorkKind::Inspect && item.path() == self.root
    }
}

fn invalid_root(path: &Path, reason: &str) -> ScanError {
    ScanError::InvalidArgument {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Node {
        Dir(Vec<OsString>),
        File(u64),
        Link,
    }

    /// In-memory tree with injectable latency and failures
    #[derive(Default)]
    struct MemFs {
        nodes: HashMap<PathBuf, Node>,
        failures: HashMap<(PathBuf, WorkKind), io::ErrorKind>,
        latency: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MemFs {
        fn new(root: &str) -> Self {
            let mut fs = Self::default();
            fs.nodes.insert(PathBuf::from(root), Node::Dir(Vec::new()));
            fs
        }

        fn insert(mut self, path: &str, node: Node) -> Self {
            let path = PathBuf::from(path);
            if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
                if let Some(Node::Dir(children)) = self.nodes.get_mut(parent) {
                    children.push(name.to_os_string());
                }
            }
            self.nodes.insert(path, node);
            self
        }

        fn dir(self, path: &str) -> Self {
            self.insert(path, Node::Dir(Vec::new()))
        }

        fn file(self, path: &str, size: u64) -> Self {
            self.insert(path, Node::File(size))
        }

        fn link(self, path: &str) -> Self {
            self.insert(path, Node::Link)
        }

        fn fail(mut self, path: &str, kind: io::ErrorKind) -> Self {
            self.failures
                .insert((PathBuf::from(path), WorkKind::Inspect), kind);
            self
        }

        fn fail_list(mut self, path: &str, kind: io::ErrorKind) -> Self {
            self.failures.insert((PathBuf::from(path), WorkKind::List), kind);
            self
        }

        fn latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        async fn enter(&self, op: WorkKind, path: &Path) -> io::Result<()> {
            if let Some(kind) = self.failures.get(&(path.to_path_buf(), op)) {
                return Err(io::Error::from(*kind));
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl FileSystem for Arc<MemFs> {
        async fn stat(&self, path: &Path) -> io::Result<EntryKind> {
            self.enter(WorkKind::Inspect, path).await?;
            match self.nodes.get(path) {
                Some(Node::Dir(_)) => Ok(EntryKind::Directory),
                Some(Node::File(size)) => Ok(EntryKind::File { size: *size }),
                Some(Node::Link) => Ok(EntryKind::Other),
                None => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }

        async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
            self.enter(WorkKind::List, path).await?;
            match self.nodes.get(path) {
                Some(Node::Dir(children)) => Ok(children.clone()),
                Some(_) => Err(io::Error::from(io::ErrorKind::NotADirectory)),
                None => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }
    }

    fn wide_tree(files: usize) -> MemFs {
        fill(MemFs::new("/r"), files)
    }

    fn fill(fs: MemFs, files: usize) -> MemFs {
        (0..files).fold(fs, |fs, i| fs.file(&format!("/r/f{i}"), 10))
    }

    async fn scan(fs: &Arc<MemFs>, limit: usize) -> Result<Report> {
        Scheduler::with_fs(Arc::clone(fs), "/r", limit).run().await
    }

    #[tokio::test]
    async fn test_one_file_one_empty_dir() {
        let fs = Arc::new(MemFs::new("/r").file("/r/a", 100).dir("/r/sub"));
        let report = scan(&fs, 1).await.unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.directories, 1);
        assert_eq!(report.bytes, 100);
        assert_eq!(report.root, PathBuf::from("/r"));
        assert_eq!(report.limit, 1);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_totals_independent_of_limit() {
        let fs = Arc::new(
            MemFs::new("/r")
                .dir("/r/a")
                .dir("/r/a/b")
                .file("/r/a/b/deep", 7)
                .file("/r/a/x", 3)
                .file("/r/top", 1000)
                .link("/r/a/ln")
                .dir("/r/empty"),
        );

        let baseline = scan(&fs, 0).await.unwrap().totals();
        assert_eq!(
            baseline,
            Totals {
                bytes: 1010,
                files: 3,
                directories: 3
            }
        );

        for limit in [1, 2, 3, 8, 64] {
            let report = scan(&fs, limit).await.unwrap();
            assert_eq!(report.totals(), baseline, "limit {limit}");
        }
    }

    #[tokio::test]
    async fn test_ceiling_is_respected() {
        let fs = Arc::new(wide_tree(50).latency(Duration::from_millis(5)));

        for limit in [1, 3, 7] {
            fs.peak.store(0, Ordering::SeqCst);
            let report = scan(&fs, limit).await.unwrap();
            assert_eq!(report.files, 50);
            assert_eq!(report.max_active, limit);
            assert!(fs.peak.load(Ordering::SeqCst) <= limit);
        }
    }

    #[tokio::test]
    async fn test_unbounded_fills_eagerly() {
        let fs = Arc::new(wide_tree(50).latency(Duration::from_millis(5)));
        let report = scan(&fs, 0).await.unwrap();

        // Listing the root enqueues all 50 inspections at once; the
        // current-thread test runtime launches them before any completes.
        assert_eq!(report.max_active, 50);
    }

    #[tokio::test]
    async fn test_missing_root_is_invalid_argument() {
        let fs = Arc::new(MemFs::new("/r"));
        let err = Scheduler::with_fs(fs, "/nope", 4).run().await.unwrap_err();
        assert!(err.is_invalid_argument(), "{err}");
        assert_eq!(err.path(), Some(Path::new("/nope")));
    }

    #[tokio::test]
    async fn test_file_root_is_invalid_argument() {
        let fs = Arc::new(MemFs::new("/r").file("/r/a", 1));
        let err = Scheduler::with_fs(fs, "/r/a", 0).run().await.unwrap_err();
        assert!(err.is_invalid_argument(), "{err}");
    }

    #[tokio::test]
    async fn test_root_permission_error_is_traversal() {
        let fs = Arc::new(MemFs::new("/r").fail("/r", io::ErrorKind::PermissionDenied));
        let err = scan(&fs, 0).await.unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[tokio::test]
    async fn test_stat_failure_drains_in_flight_work() {
        let fs = Arc::new(
            wide_tree(20)
                .file("/r/locked", 5)
                .fail("/r/locked", io::ErrorKind::PermissionDenied)
                .latency(Duration::from_millis(10)),
        );

        let err = tokio::time::timeout(Duration::from_secs(5), scan(&fs, 4))
            .await
            .expect("scan hung")
            .unwrap_err();

        assert!(matches!(
            err,
            ScanError::Traversal {
                op: WorkKind::Inspect,
                ..
            }
        ));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
        assert_eq!(err.path(), Some(Path::new("/r/locked")));
        assert_eq!(fs.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_best_effort_returns_before_in_flight_work() {
        // Failures return before the simulated latency. The failing entry
        // is listed first, so it is popped last and its siblings are
        // already sleeping when it fails.
        let fs = MemFs::new("/r")
            .file("/r/locked", 5)
            .fail("/r/locked", io::ErrorKind::PermissionDenied);
        let fs = Arc::new(fill(fs, 20).latency(Duration::from_millis(50)));

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            Scheduler::with_fs(Arc::clone(&fs), "/r", 0)
                .cancellation(Cancellation::BestEffort)
                .run(),
        )
        .await
        .expect("scan hung")
        .unwrap_err();

        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
        assert!(fs.in_flight.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_first_error_wins() {
        let fs = Arc::new(
            MemFs::new("/r")
                .file("/r/a", 1)
                .file("/r/b", 1)
                .fail("/r/a", io::ErrorKind::PermissionDenied)
                .fail("/r/b", io::ErrorKind::PermissionDenied),
        );

        let err = scan(&fs, 0).await.unwrap_err();
        let path = err.path().map(Path::to_path_buf);
        assert!(
            path == Some(PathBuf::from("/r/a")) || path == Some(PathBuf::from("/r/b")),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_list_failure_is_traversal() {
        let fs = Arc::new(
            MemFs::new("/r")
                .dir("/r/sub")
                .file("/r/sub/inner", 1)
                .fail_list("/r/sub", io::ErrorKind::PermissionDenied),
        );

        let err = scan(&fs, 2).await.unwrap_err();
        assert!(matches!(err, ScanError::Traversal { op: WorkKind::List, .. }));
        assert_eq!(err.path(), Some(Path::new("/r/sub")));
    }

    #[tokio::test]
    async fn test_observer_sees_every_item() {
        let fs = Arc::new(MemFs::new("/r").file("/r/a", 100).dir("/r/sub"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        Scheduler::with_fs(fs, "/r", 0)
            .observer(move |kind: WorkKind, path: &Path, info: &str| {
                sink.lock()
                    .push((kind, path.to_path_buf(), info.to_string()));
            })
            .run()
            .await
            .unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen.iter().filter(|(k, _, _)| *k == WorkKind::List).count(), 2);
        assert!(seen.contains(&(
            WorkKind::Inspect,
            PathBuf::from("/r/a"),
            "file 100 bytes".to_string()
        )));
        assert!(seen.contains(&(
            WorkKind::List,
            PathBuf::from("/r"),
            "2 entries".to_string()
        )));
    }

    #[test]
    fn test_resolve_is_exactly_once() {
        let (tx, mut rx) = oneshot::channel();
        let mut state = State {
            pending: Vec::new(),
            active: 0,
            max_active: 0,
            totals: Totals::default(),
            failure: None,
            outcome: Some(tx),
            started_at: Utc::now(),
        };

        state.resolve(Err(ScanError::Abandoned));
        assert!(state.is_resolved());
        state.resolve(Err(ScanError::InvalidArgument {
            path: PathBuf::from("/x"),
            reason: "late".into(),
        }));

        assert!(matches!(rx.try_recv(), Ok(Err(ScanError::Abandoned))));
    }
}
