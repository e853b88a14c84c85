//! throttled-du - Disk Usage with Bounded I/O Concurrency
//!
//! Recursively measures the size of a directory tree while capping how
//! many filesystem operations are in flight at once. Running the same tree
//! at different ceilings shows how I/O concurrency affects wall-clock
//! throughput on a given medium (spinning disk, SSD, network mount).
//!
//! # Features
//!
//! - **Bounded Concurrency**: A ceiling on simultaneous stat/readdir calls,
//!   or none at all (`0`).
//!
//! - **Dynamic Work Discovery**: The tree's shape is unknown up front;
//!   every completed item feeds follow-up items back into one queue.
//!
//! - **Deterministic Aggregates**: File count, directory count and total
//!   size do not depend on the ceiling, only the timing does.
//!
//! - **First-Error-Wins**: Any filesystem error ends the scan with exactly
//!   one error, either after in-flight work drains or immediately.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Experiment (CLI)                          │
//! │        for each limit × run: Scheduler::run() → Report           │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Scheduler                               │
//! │   pending stack ──step()──► tokio tasks (≤ limit in flight)      │
//! │        ▲                          │                              │
//! │        └──── follow-up items ─────┘                              │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ stat / read_dir
//!                               ▼
//!                    ┌──────────────────┐
//!                    │    FileSystem    │
//!                    │  (LocalFs/tokio) │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> throttled_du::Result<()> {
//! let report = throttled_du::run("/data", 8).await?;
//! println!("{} files, {} bytes", report.files, report.bytes);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod scheduler;

pub use config::{CliArgs, ExperimentConfig, ReportFormat};
pub use error::{ConfigError, Result, ScanError};
pub use scheduler::{run, Cancellation, Report, Scheduler, WorkKind, WorkObserver};
