//! Bounded-concurrency disk usage scheduler
//!
//! This module drives a scan as a dynamically growing queue of work items
//! with a configurable ceiling on in-flight filesystem operations.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │        Scheduler        │
//!                     │  - pending stack        │
//!                     │  - active counter       │
//!                     │  - one-shot outcome     │
//!                     └───────────┬─────────────┘
//!                                 │ step(): launch up to `limit`
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │ Inspect   │             │   List    │             │ Inspect   │
//! │ stat()    │             │ read_dir()│             │ stat()    │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └──── follow-up items + counters, applied under lock ┘
//! ```

mod engine;
mod execute;
pub mod fs;
pub mod item;
pub mod observer;
pub mod report;

pub use engine::{run, Cancellation, Scheduler};
pub use fs::{EntryKind, FileSystem, LocalFs};
pub use item::{WorkItem, WorkKind};
pub use observer::{TracingObserver, WorkObserver};
pub use report::{Report, Totals};
